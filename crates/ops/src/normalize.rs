//! Raw-record cleanup: dollar-string amounts, y/m/d calendar dates, yes/no flags.
//!
//! A malformed amount or an impossible date fails the run rather than silently
//! dropping the record; the error names the offending value.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};
use chrono::{Datelike, Duration, NaiveDate};
use txc_common::{Result, TxcError};

use crate::row::{RowSet, ScalarValue};

/// Contract schema of a raw transaction shard.
pub fn raw_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("user", DataType::Int64, false),
        Field::new("card", DataType::Int64, false),
        Field::new("merchant_state", DataType::Utf8, true),
        Field::new("use_chip", DataType::Utf8, false),
        Field::new("amount", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("month", DataType::Int64, false),
        Field::new("day", DataType::Int64, false),
        Field::new("is_fraud", DataType::Utf8, false),
    ]))
}

/// Schema after normalization: typed amount, a single Date32 column, a
/// boolean fraud flag. The y/m/d parts are consumed by the derived date.
pub fn normalized_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("user", DataType::Int64, false),
        Field::new("card", DataType::Int64, false),
        Field::new("merchant_state", DataType::Utf8, true),
        Field::new("use_chip", DataType::Utf8, false),
        Field::new("amount", DataType::Float64, false),
        Field::new("date", DataType::Date32, false),
        Field::new("is_fraud", DataType::Boolean, false),
    ]))
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("unix epoch is a valid date")
}

pub fn days_since_epoch(date: NaiveDate) -> i32 {
    date.signed_duration_since(unix_epoch()).num_days() as i32
}

pub fn date_from_days(days: i32) -> NaiveDate {
    unix_epoch() + Duration::days(i64::from(days))
}

/// Truncates a Date32 day count to the first day of its month.
pub fn month_start_days(days: i32) -> i32 {
    let date = date_from_days(days);
    let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("first of an existing month is valid");
    days_since_epoch(start)
}

/// Normalizes a raw row set into the [`normalized_schema`] shape.
pub fn normalize(input: &RowSet) -> Result<RowSet> {
    let user = input.column_index("user")?;
    let card = input.column_index("card")?;
    let state = input.column_index("merchant_state")?;
    let chip = input.column_index("use_chip")?;
    let amount = input.column_index("amount")?;
    let year = input.column_index("year")?;
    let month = input.column_index("month")?;
    let day = input.column_index("day")?;
    let fraud = input.column_index("is_fraud")?;

    let mut rows = Vec::with_capacity(input.rows.len());
    for row in &input.rows {
        let parsed_amount = match &row[amount] {
            ScalarValue::Utf8(s) => ScalarValue::float(parse_amount(s)?),
            other => {
                return Err(TxcError::Execution(format!(
                    "amount must be a string, got {other:?}"
                )))
            }
        };
        let date = ScalarValue::Date32(date_from_parts(&row[year], &row[month], &row[day])?);
        let is_fraud = match &row[fraud] {
            ScalarValue::Utf8(s) => ScalarValue::Boolean(s.eq_ignore_ascii_case("yes")),
            other => {
                return Err(TxcError::Execution(format!(
                    "is_fraud must be a string, got {other:?}"
                )))
            }
        };
        rows.push(vec![
            row[user].clone(),
            row[card].clone(),
            row[state].clone(),
            row[chip].clone(),
            parsed_amount,
            date,
            is_fraud,
        ]);
    }
    Ok(RowSet::new(normalized_schema(), rows))
}

/// Parses amounts like `"$1,234.56"` or `"-42.10"`.
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| TxcError::Execution(format!("unparseable amount: '{s}'")))
}

fn date_from_parts(year: &ScalarValue, month: &ScalarValue, day: &ScalarValue) -> Result<i32> {
    let (y, m, d) = match (year, month, day) {
        (ScalarValue::Int64(y), ScalarValue::Int64(m), ScalarValue::Int64(d)) => (*y, *m, *d),
        other => {
            return Err(TxcError::Execution(format!(
                "date parts must be integers, got {other:?}"
            )))
        }
    };
    let date = u32::try_from(m)
        .ok()
        .zip(u32::try_from(d).ok())
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(y as i32, m, d))
        .ok_or_else(|| TxcError::Execution(format!("impossible calendar date: {y}-{m}-{d}")))?;
    Ok(days_since_epoch(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row(amount: &str, y: i64, m: i64, d: i64) -> Vec<ScalarValue> {
        vec![
            ScalarValue::Int64(7),
            ScalarValue::Int64(1),
            ScalarValue::Utf8("CA".to_string()),
            ScalarValue::Utf8("Chip Transaction".to_string()),
            ScalarValue::Utf8(amount.to_string()),
            ScalarValue::Int64(y),
            ScalarValue::Int64(m),
            ScalarValue::Int64(d),
            ScalarValue::Utf8("No".to_string()),
        ]
    }

    #[test]
    fn dollar_strings_parse_with_separators() {
        let input = RowSet::new(raw_schema(), vec![raw_row("$1,234.50", 2023, 3, 15)]);
        let out = normalize(&input).expect("normalize");
        assert_eq!(out.rows[0][4], ScalarValue::float(1234.5));
        let expected = days_since_epoch(NaiveDate::from_ymd_opt(2023, 3, 15).expect("date"));
        assert_eq!(out.rows[0][5], ScalarValue::Date32(expected));
        assert_eq!(out.rows[0][6], ScalarValue::Boolean(false));
    }

    #[test]
    fn fraud_flag_is_case_insensitive() {
        let mut row = raw_row("$1.00", 2023, 1, 1);
        row[8] = ScalarValue::Utf8("YES".to_string());
        let out = normalize(&RowSet::new(raw_schema(), vec![row])).expect("normalize");
        assert_eq!(out.rows[0][6], ScalarValue::Boolean(true));
    }

    #[test]
    fn impossible_date_fails_the_run() {
        let input = RowSet::new(raw_schema(), vec![raw_row("$1.00", 2023, 2, 30)]);
        let err = normalize(&input).expect_err("feb 30 must fail");
        assert!(err.to_string().contains("2023-2-30"), "{err}");
    }

    #[test]
    fn garbage_amount_fails_the_run() {
        let input = RowSet::new(raw_schema(), vec![raw_row("$abc", 2023, 1, 1)]);
        assert!(normalize(&input).is_err());
    }

    #[test]
    fn month_start_truncation() {
        let mid = days_since_epoch(NaiveDate::from_ymd_opt(2023, 7, 19).expect("date"));
        let first = days_since_epoch(NaiveDate::from_ymd_opt(2023, 7, 1).expect("date"));
        assert_eq!(month_start_days(mid), first);
        assert_eq!(month_start_days(first), first);
    }
}
