//! Hash grouped aggregation with post-aggregation filtering and top-N ranking.

use std::collections::HashMap;

use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;
use txc_common::{Result, TxcError};

use crate::row::{cmp_row_at, cmp_scalar, RowSet, ScalarValue};

/// Aggregate over a column index of the input row set.
#[derive(Debug, Clone, Copy)]
pub enum AggExpr {
    /// Row count of the group.
    Count,
    SumInt(usize),
    SumFloat(usize),
}

#[derive(Debug, Clone)]
enum AggState {
    Count(i64),
    SumInt(i64),
    SumFloat(f64),
}

/// One output row per distinct group-key value present in the input, group
/// keys first, then one column per aggregate. Null is a groupable key value.
///
/// Output rows are sorted lexicographically by group key so repeated runs on
/// identical input produce identical row sets.
pub fn hash_group_sum(
    input: &RowSet,
    group_cols: &[usize],
    aggs: &[(AggExpr, &str)],
) -> Result<RowSet> {
    if group_cols.is_empty() {
        return Err(TxcError::Analysis(
            "grouped aggregation requires at least one group column".to_string(),
        ));
    }
    let width = input.schema.fields().len();
    for &c in group_cols {
        if c >= width {
            return Err(TxcError::Analysis(format!(
                "group column index {c} out of range for {width}-column input"
            )));
        }
    }

    let mut groups: HashMap<Vec<ScalarValue>, Vec<AggState>> = HashMap::new();
    for row in &input.rows {
        let key: Vec<ScalarValue> = group_cols.iter().map(|&c| row[c].clone()).collect();
        let states = groups.entry(key).or_insert_with(|| init_states(aggs));
        for (state, (agg, _)) in states.iter_mut().zip(aggs.iter()) {
            accumulate(state, agg, row)?;
        }
    }

    let mut fields: Vec<Field> = group_cols
        .iter()
        .map(|&c| input.schema.field(c).clone())
        .collect();
    for (agg, name) in aggs {
        let dt = match agg {
            AggExpr::Count | AggExpr::SumInt(_) => DataType::Int64,
            AggExpr::SumFloat(_) => DataType::Float64,
        };
        fields.push(Field::new(name.to_string(), dt, false));
    }
    let schema = Arc::new(Schema::new(fields));

    let mut rows: Vec<Vec<ScalarValue>> = groups
        .into_iter()
        .map(|(key, states)| {
            let mut row = key;
            row.extend(states.into_iter().map(state_value));
            row
        })
        .collect();
    let key_cols: Vec<usize> = (0..group_cols.len()).collect();
    rows.sort_by(|a, b| cmp_row_at(a, b, &key_cols));

    tracing::debug!(
        input_rows = input.rows.len(),
        groups = rows.len(),
        "hash grouped aggregation complete"
    );
    Ok(RowSet::new(schema, rows))
}

fn init_states(aggs: &[(AggExpr, &str)]) -> Vec<AggState> {
    aggs.iter()
        .map(|(agg, _)| match agg {
            AggExpr::Count => AggState::Count(0),
            AggExpr::SumInt(_) => AggState::SumInt(0),
            AggExpr::SumFloat(_) => AggState::SumFloat(0.0),
        })
        .collect()
}

fn accumulate(state: &mut AggState, agg: &AggExpr, row: &[ScalarValue]) -> Result<()> {
    match (state, agg) {
        (AggState::Count(n), AggExpr::Count) => *n += 1,
        (AggState::SumInt(acc), AggExpr::SumInt(col)) => match &row[*col] {
            ScalarValue::Int64(v) => *acc += *v,
            ScalarValue::Null => {}
            other => {
                return Err(TxcError::Execution(format!(
                    "integer sum over non-integer value {other:?}"
                )))
            }
        },
        (AggState::SumFloat(acc), AggExpr::SumFloat(col)) => match &row[*col] {
            ScalarValue::Null => {}
            v => {
                *acc += v.as_f64().ok_or_else(|| {
                    TxcError::Execution(format!("float sum over non-numeric value {v:?}"))
                })?
            }
        },
        _ => {
            return Err(TxcError::Execution(
                "aggregate state does not match its expression".to_string(),
            ))
        }
    }
    Ok(())
}

fn state_value(state: AggState) -> ScalarValue {
    match state {
        AggState::Count(n) | AggState::SumInt(n) => ScalarValue::Int64(n),
        AggState::SumFloat(v) => ScalarValue::float(v),
    }
}

/// Post-aggregation filter: keep rows whose `total_col` reaches `min_total`.
pub fn filter_min_total(mut input: RowSet, total_col: usize, min_total: f64) -> RowSet {
    input
        .rows
        .retain(|row| row[total_col].as_f64().is_some_and(|v| v >= min_total));
    input
}

/// Descending top-N by `measure_col`; ties break deterministically by
/// ascending `key_col` rather than input order.
pub fn top_n_by(mut input: RowSet, measure_col: usize, key_col: usize, n: usize) -> RowSet {
    input.rows.sort_by(|a, b| {
        cmp_scalar(&b[measure_col], &a[measure_col])
            .then_with(|| cmp_scalar(&a[key_col], &b[key_col]))
    });
    input.rows.truncate(n);
    input
}

#[cfg(test)]
mod tests {
    use arrow_schema::{DataType, Field, Schema};

    use super::*;

    fn input() -> RowSet {
        let schema = Arc::new(Schema::new(vec![
            Field::new("state", DataType::Utf8, true),
            Field::new("amount", DataType::Float64, false),
        ]));
        let row = |state: Option<&str>, amount: f64| {
            vec![
                state
                    .map(|s| ScalarValue::Utf8(s.to_string()))
                    .unwrap_or(ScalarValue::Null),
                ScalarValue::float(amount),
            ]
        };
        RowSet::new(
            schema,
            vec![
                row(Some("TX"), 10.0),
                row(Some("CA"), 5.0),
                row(Some("TX"), 2.5),
                row(None, 1.0),
            ],
        )
    }

    fn group(input: &RowSet) -> RowSet {
        hash_group_sum(
            input,
            &[0],
            &[(AggExpr::Count, "txn_count"), (AggExpr::SumFloat(1), "total_amount")],
        )
        .expect("aggregate")
    }

    #[test]
    fn one_row_per_key_with_null_group() {
        let out = group(&input());
        assert_eq!(out.num_rows(), 3);
        // Sorted by key, null first.
        assert_eq!(out.rows[0][0], ScalarValue::Null);
        assert_eq!(out.rows[1][0], ScalarValue::Utf8("CA".to_string()));
        assert_eq!(out.rows[2][0], ScalarValue::Utf8("TX".to_string()));
        assert_eq!(out.rows[2][1], ScalarValue::Int64(2));
        assert_eq!(out.rows[2][2], ScalarValue::float(12.5));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let mut empty = input();
        empty.rows.clear();
        let out = group(&empty);
        assert!(out.is_empty());
        assert_eq!(out.schema.fields().len(), 3);
    }

    #[test]
    fn min_total_filter_applies_after_summation() {
        let out = filter_min_total(group(&input()), 2, 5.0);
        let keys: Vec<_> = out.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(
            keys,
            vec![
                ScalarValue::Utf8("CA".to_string()),
                ScalarValue::Utf8("TX".to_string())
            ]
        );
    }

    #[test]
    fn top_n_breaks_ties_by_ascending_key() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("state", DataType::Utf8, false),
            Field::new("total", DataType::Float64, false),
        ]));
        let row = |k: &str, v: f64| vec![ScalarValue::Utf8(k.to_string()), ScalarValue::float(v)];
        let set = RowSet::new(
            schema,
            vec![row("NY", 50.0), row("CA", 50.0), row("TX", 80.0), row("WA", 10.0)],
        );
        let out = top_n_by(set, 1, 0, 3);
        let keys: Vec<_> = out
            .rows
            .iter()
            .map(|r| match &r[0] {
                ScalarValue::Utf8(s) => s.clone(),
                other => panic!("unexpected key {other:?}"),
            })
            .collect();
        assert_eq!(keys, vec!["TX", "CA", "NY"]);
    }
}
