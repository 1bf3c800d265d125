//! Full outer join of two aggregate row sets on a shared key.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arrow_schema::{Field, Schema};
use txc_common::{Result, TxcError};

use crate::row::{RowSet, ScalarValue};

/// Hash-based full outer join.
///
/// Both inputs must be keyed uniquely (one row per key value), as grouped
/// aggregation guarantees; a duplicate key on either side is an execution
/// error. Every key present in either input appears exactly once in the
/// output: the coalesced key column first, then the left side's non-key
/// columns, then the right side's. A side lacking the key contributes nulls,
/// never zeros, so "no data" stays distinct from "zero value".
///
/// Output order: left rows in left order, then unmatched right rows in right
/// order.
pub fn full_outer_join(
    left: &RowSet,
    right: &RowSet,
    left_key: usize,
    right_key: usize,
) -> Result<RowSet> {
    let left_width = left.schema.fields().len();
    let right_width = right.schema.fields().len();
    if left_key >= left_width || right_key >= right_width {
        return Err(TxcError::Analysis(
            "join key index out of range".to_string(),
        ));
    }

    let key_field = {
        let l = left.schema.field(left_key);
        let r = right.schema.field(right_key);
        Field::new(l.name(), l.data_type().clone(), l.is_nullable() || r.is_nullable())
    };
    let mut fields = vec![key_field];
    for (idx, f) in left.schema.fields().iter().enumerate() {
        if idx != left_key {
            fields.push(f.as_ref().clone().with_nullable(true));
        }
    }
    for (idx, f) in right.schema.fields().iter().enumerate() {
        if idx != right_key {
            fields.push(f.as_ref().clone().with_nullable(true));
        }
    }
    let schema = Arc::new(Schema::new(fields));

    let mut right_by_key: HashMap<ScalarValue, usize> = HashMap::new();
    for (idx, row) in right.rows.iter().enumerate() {
        if right_by_key.insert(row[right_key].clone(), idx).is_some() {
            return Err(TxcError::Execution(format!(
                "duplicate join key on right side: {:?}",
                row[right_key]
            )));
        }
    }

    let mut seen_left: HashSet<ScalarValue> = HashSet::new();
    let mut matched_right = vec![false; right.rows.len()];
    let mut rows = Vec::with_capacity(left.rows.len() + right.rows.len());

    for row in &left.rows {
        let key = row[left_key].clone();
        if !seen_left.insert(key.clone()) {
            return Err(TxcError::Execution(format!(
                "duplicate join key on left side: {key:?}"
            )));
        }
        let mut out = Vec::with_capacity(schema.fields().len());
        out.push(key.clone());
        for (idx, v) in row.iter().enumerate() {
            if idx != left_key {
                out.push(v.clone());
            }
        }
        match right_by_key.get(&key) {
            Some(&ridx) => {
                matched_right[ridx] = true;
                for (idx, v) in right.rows[ridx].iter().enumerate() {
                    if idx != right_key {
                        out.push(v.clone());
                    }
                }
            }
            None => out.extend(std::iter::repeat(ScalarValue::Null).take(right_width - 1)),
        }
        rows.push(out);
    }

    for (ridx, row) in right.rows.iter().enumerate() {
        if matched_right[ridx] {
            continue;
        }
        let mut out = Vec::with_capacity(schema.fields().len());
        out.push(row[right_key].clone());
        out.extend(std::iter::repeat(ScalarValue::Null).take(left_width - 1));
        for (idx, v) in row.iter().enumerate() {
            if idx != right_key {
                out.push(v.clone());
            }
        }
        rows.push(out);
    }

    tracing::debug!(
        left_rows = left.rows.len(),
        right_rows = right.rows.len(),
        output_rows = rows.len(),
        "full outer join complete"
    );
    Ok(RowSet::new(schema, rows))
}
