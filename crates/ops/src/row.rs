//! Row-oriented value model used by the operator layer.
//!
//! Operators (group-by, join, window) work on `Vec<ScalarValue>` rows decoded
//! from Arrow batches and re-encode their output into a single batch. Floats
//! are carried as raw bits so group/join keys stay hashable.

use std::cmp::Ordering;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, BooleanBuilder, Date32Array, Date32Builder, Float64Array,
    Float64Builder, Int64Array, Int64Builder, StringArray, StringBuilder,
};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, SchemaRef};
use txc_common::{Result, TxcError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarValue {
    Int64(i64),
    /// `f64::to_bits` of the value, so rows can be hashed and compared.
    Float64Bits(u64),
    Utf8(String),
    Boolean(bool),
    /// Days since the unix epoch, matching Arrow's `Date32`.
    Date32(i32),
    Null,
}

impl ScalarValue {
    pub fn float(v: f64) -> Self {
        Self::Float64Bits(v.to_bits())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value; integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64Bits(v) => Some(f64::from_bits(*v)),
            _ => None,
        }
    }
}

/// Total order over scalars: null sorts first, numerics compare by value,
/// everything else falls back to a stable textual ordering.
pub fn cmp_scalar(a: &ScalarValue, b: &ScalarValue) -> Ordering {
    use ScalarValue::*;
    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Null, _) => Ordering::Less,
        (_, Null) => Ordering::Greater,
        (Int64(x), Int64(y)) => x.cmp(y),
        (Float64Bits(x), Float64Bits(y)) => f64::from_bits(*x).total_cmp(&f64::from_bits(*y)),
        (Int64(x), Float64Bits(y)) => (*x as f64).total_cmp(&f64::from_bits(*y)),
        (Float64Bits(x), Int64(y)) => f64::from_bits(*x).total_cmp(&(*y as f64)),
        (Utf8(x), Utf8(y)) => x.cmp(y),
        (Boolean(x), Boolean(y)) => x.cmp(y),
        (Date32(x), Date32(y)) => x.cmp(y),
        _ => format!("{a:?}").cmp(&format!("{b:?}")),
    }
}

/// Lexicographic comparison of whole rows restricted to `cols`.
pub fn cmp_row_at(a: &[ScalarValue], b: &[ScalarValue], cols: &[usize]) -> Ordering {
    for &c in cols {
        let ord = cmp_scalar(&a[c], &b[c]);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// A schema plus decoded rows; the unit every operator consumes and produces.
#[derive(Debug, Clone)]
pub struct RowSet {
    pub schema: SchemaRef,
    pub rows: Vec<Vec<ScalarValue>>,
}

impl RowSet {
    pub fn new(schema: SchemaRef, rows: Vec<Vec<ScalarValue>>) -> Self {
        Self { schema, rows }
    }

    /// Decodes batches into rows under the given schema.
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let mut rows = Vec::new();
        for batch in batches {
            if batch.num_columns() != schema.fields().len() {
                return Err(TxcError::Execution(format!(
                    "batch has {} columns, schema expects {}",
                    batch.num_columns(),
                    schema.fields().len()
                )));
            }
            for row in 0..batch.num_rows() {
                let mut values = Vec::with_capacity(batch.num_columns());
                for col in 0..batch.num_columns() {
                    values.push(scalar_from_array(batch.column(col), row)?);
                }
                rows.push(values);
            }
        }
        Ok(Self { schema, rows })
    }

    /// Re-encodes all rows into one batch with this row set's schema.
    pub fn to_batch(&self) -> Result<RecordBatch> {
        let mut cols =
            vec![Vec::<ScalarValue>::with_capacity(self.rows.len()); self.schema.fields().len()];
        for row in &self.rows {
            for (idx, value) in row.iter().enumerate() {
                cols[idx].push(value.clone());
            }
        }
        let arrays = cols
            .iter()
            .enumerate()
            .map(|(idx, col)| scalars_to_array(col, self.schema.field(idx).data_type()))
            .collect::<Result<Vec<_>>>()?;
        RecordBatch::try_new(self.schema.clone(), arrays)
            .map_err(|e| TxcError::Execution(format!("output batch build failed: {e}")))
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.schema
            .index_of(name)
            .map_err(|_| TxcError::Analysis(format!("unknown column: {name}")))
    }

    /// Keeps rows whose `col` equals `value` (null matches only null).
    pub fn filter_eq(mut self, col: usize, value: &ScalarValue) -> Self {
        self.rows.retain(|row| row[col] == *value);
        self
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn scalar_from_array(array: &ArrayRef, row: usize) -> Result<ScalarValue> {
    if array.is_null(row) {
        return Ok(ScalarValue::Null);
    }
    match array.data_type() {
        DataType::Int64 => {
            let a = array
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| TxcError::Execution("expected Int64Array".to_string()))?;
            Ok(ScalarValue::Int64(a.value(row)))
        }
        DataType::Float64 => {
            let a = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| TxcError::Execution("expected Float64Array".to_string()))?;
            Ok(ScalarValue::Float64Bits(a.value(row).to_bits()))
        }
        DataType::Utf8 => {
            let a = array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| TxcError::Execution("expected StringArray".to_string()))?;
            Ok(ScalarValue::Utf8(a.value(row).to_string()))
        }
        DataType::Boolean => {
            let a = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(|| TxcError::Execution("expected BooleanArray".to_string()))?;
            Ok(ScalarValue::Boolean(a.value(row)))
        }
        DataType::Date32 => {
            let a = array
                .as_any()
                .downcast_ref::<Date32Array>()
                .ok_or_else(|| TxcError::Execution("expected Date32Array".to_string()))?;
            Ok(ScalarValue::Date32(a.value(row)))
        }
        other => Err(TxcError::Unsupported(format!(
            "scalar type not supported: {other:?}"
        ))),
    }
}

pub fn scalars_to_array(values: &[ScalarValue], dt: &DataType) -> Result<ArrayRef> {
    match dt {
        DataType::Int64 => {
            let mut b = Int64Builder::with_capacity(values.len());
            for v in values {
                match v {
                    ScalarValue::Int64(x) => b.append_value(*x),
                    ScalarValue::Null => b.append_null(),
                    _ => return Err(type_mismatch("Int64", v)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        DataType::Float64 => {
            let mut b = Float64Builder::with_capacity(values.len());
            for v in values {
                match v {
                    ScalarValue::Float64Bits(x) => b.append_value(f64::from_bits(*x)),
                    ScalarValue::Int64(x) => b.append_value(*x as f64),
                    ScalarValue::Null => b.append_null(),
                    _ => return Err(type_mismatch("Float64", v)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        DataType::Utf8 => {
            let mut b = StringBuilder::new();
            for v in values {
                match v {
                    ScalarValue::Utf8(x) => b.append_value(x),
                    ScalarValue::Null => b.append_null(),
                    _ => return Err(type_mismatch("Utf8", v)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        DataType::Boolean => {
            let mut b = BooleanBuilder::with_capacity(values.len());
            for v in values {
                match v {
                    ScalarValue::Boolean(x) => b.append_value(*x),
                    ScalarValue::Null => b.append_null(),
                    _ => return Err(type_mismatch("Boolean", v)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        DataType::Date32 => {
            let mut b = Date32Builder::with_capacity(values.len());
            for v in values {
                match v {
                    ScalarValue::Date32(x) => b.append_value(*x),
                    ScalarValue::Null => b.append_null(),
                    _ => return Err(type_mismatch("Date32", v)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        other => Err(TxcError::Unsupported(format!(
            "array type not supported: {other:?}"
        ))),
    }
}

fn type_mismatch(expected: &str, got: &ScalarValue) -> TxcError {
    TxcError::Execution(format!(
        "type mismatch while building {expected} array, got {got:?}"
    ))
}
