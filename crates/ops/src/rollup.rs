//! Month-start rollup feeding the materialized monthly aggregate.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};
use txc_common::{Result, TxcError};

use crate::aggregate::{hash_group_sum, AggExpr};
use crate::normalize::month_start_days;
use crate::row::{RowSet, ScalarValue};

/// Groups normalized records by the first day of their month and sums the
/// amount, rounded to the nearest whole unit, alongside a row count.
///
/// Output: `month` Date32, `total_amount` Float64 (rounded), `txn_count`
/// Int64, one row per distinct calendar month, sorted ascending by month.
/// Empty input produces an empty row set, not an error.
pub fn monthly_rollup(input: &RowSet, date_col: usize, amount_col: usize) -> Result<RowSet> {
    if input.schema.field(date_col).data_type() != &DataType::Date32 {
        return Err(TxcError::Analysis(format!(
            "rollup date column '{}' must be Date32",
            input.schema.field(date_col).name()
        )));
    }

    let keyed_schema = Arc::new(Schema::new(vec![
        Field::new("month", DataType::Date32, false),
        Field::new("amount", DataType::Float64, false),
    ]));
    let mut keyed_rows = Vec::with_capacity(input.rows.len());
    for row in &input.rows {
        let month = match row[date_col] {
            ScalarValue::Date32(days) => ScalarValue::Date32(month_start_days(days)),
            ref other => {
                return Err(TxcError::Execution(format!(
                    "null or non-date value in rollup date column: {other:?}"
                )))
            }
        };
        keyed_rows.push(vec![month, row[amount_col].clone()]);
    }
    let keyed = RowSet::new(keyed_schema, keyed_rows);

    let mut out = hash_group_sum(
        &keyed,
        &[0],
        &[
            (AggExpr::SumFloat(1), "total_amount"),
            (AggExpr::Count, "txn_count"),
        ],
    )?;

    for row in &mut out.rows {
        if let Some(v) = row[1].as_f64() {
            row[1] = ScalarValue::float(v.round());
        }
    }
    Ok(out)
}
