//! Set-oriented operators over Arrow record batches.
//!
//! Architecture role:
//! - row/scalar model decoded from batches
//! - raw-record normalization
//! - hash grouped aggregation, post-filtering, top-N
//! - full outer join
//! - monthly rollup and the ordered-window analyzer
//!
//! Key modules:
//! - [`row`]
//! - [`normalize`]
//! - [`aggregate`]
//! - [`join`]
//! - [`rollup`]
//! - [`window`]
//! - [`stream`]

pub mod aggregate;
pub mod join;
pub mod normalize;
pub mod rollup;
pub mod row;
pub mod stream;
pub mod window;

pub use row::{cmp_scalar, RowSet, ScalarValue};
pub use stream::{empty_stream, RecordBatchStream, SendableRecordBatchStream, StreamAdapter};
