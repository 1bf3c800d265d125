//! Ordered-window analytics over the materialized monthly aggregate.
//!
//! A single forward pass over month-sorted rows assigns the 1-based
//! sequential index and the period-over-period growth ratios. The notion of
//! "previous row" is defined only by ascending month order, never by the
//! physical order rows arrived in.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};
use txc_common::{Result, TxcError};

use crate::row::{RowSet, ScalarValue};

/// Appends `month_index` (Int64, 1-based by ascending month) and one
/// `<measure>_growth` column (Float64, nullable) per entry of `growth_cols`,
/// computed as `current/previous - 1`.
///
/// Edge cases, deliberately distinct:
/// - the first chronological row has no previous row: growth is null;
/// - a previous value of zero is real data: growth is the IEEE quotient
///   (infinite or NaN), kept as a non-null float.
///
/// A null or duplicated month violates the materialized aggregate's
/// one-row-per-month invariant and fails execution.
pub fn monthly_sequence(input: &RowSet, month_col: usize, growth_cols: &[usize]) -> Result<RowSet> {
    if input.schema.field(month_col).data_type() != &DataType::Date32 {
        return Err(TxcError::Analysis(format!(
            "window order column '{}' must be Date32, got {:?}",
            input.schema.field(month_col).name(),
            input.schema.field(month_col).data_type()
        )));
    }

    let mut order: Vec<(i32, usize)> = Vec::with_capacity(input.rows.len());
    for (idx, row) in input.rows.iter().enumerate() {
        match row[month_col] {
            ScalarValue::Date32(days) => order.push((days, idx)),
            ref other => {
                return Err(TxcError::Execution(format!(
                    "null or non-date month in materialized aggregate: {other:?}"
                )))
            }
        }
    }
    order.sort_by_key(|(days, _)| *days);
    for pair in order.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(TxcError::Execution(format!(
                "duplicate month in materialized aggregate (Date32 day {})",
                pair[0].0
            )));
        }
    }

    let mut fields: Vec<Field> = input
        .schema
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields.push(Field::new("month_index", DataType::Int64, false));
    for &c in growth_cols {
        fields.push(Field::new(
            format!("{}_growth", input.schema.field(c).name()),
            DataType::Float64,
            true,
        ));
    }
    let schema = Arc::new(Schema::new(fields));

    let mut rows = Vec::with_capacity(input.rows.len());
    let mut prev_idx: Option<usize> = None;
    for (seq, &(_, idx)) in order.iter().enumerate() {
        let mut row = input.rows[idx].clone();
        row.push(ScalarValue::Int64(seq as i64 + 1));
        for &c in growth_cols {
            let growth = match prev_idx {
                None => ScalarValue::Null,
                Some(p) => match (input.rows[idx][c].as_f64(), input.rows[p][c].as_f64()) {
                    (Some(current), Some(previous)) => ScalarValue::float(current / previous - 1.0),
                    _ => ScalarValue::Null,
                },
            };
            row.push(growth);
        }
        rows.push(row);
        prev_idx = Some(idx);
    }

    Ok(RowSet::new(schema, rows))
}
