//! Parquet reading for shards and artifacts.

use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use txc_common::{Result, TxcError};
use txc_ops::{SendableRecordBatchStream, StreamAdapter};

use crate::shards::Shard;

/// Reads one parquet file eagerly, returning its Arrow schema and batches.
pub fn read_file(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| TxcError::Execution(format!("parquet reader build failed: {e}")))?;
    let schema = builder.schema().clone();
    let reader = builder
        .build()
        .map_err(|e| TxcError::Execution(format!("parquet reader open failed: {e}")))?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch.map_err(|e| TxcError::Execution(format!("parquet decode failed: {e}")))?);
    }
    Ok((schema, batches))
}

/// Streams the selected shards under the caller-supplied contract schema.
///
/// The embedded path reads local files eagerly and streams the decoded
/// batches; an empty selection yields an empty stream, not an error.
pub fn scan_shards(shards: &[&Shard], schema: SchemaRef) -> SendableRecordBatchStream {
    let mut out = Vec::<Result<RecordBatch>>::new();
    for shard in shards {
        match read_file(&shard.path) {
            Ok((_, batches)) => out.extend(batches.into_iter().map(Ok)),
            Err(e) => out.push(Err(e)),
        }
    }
    Box::pin(StreamAdapter::new(schema, futures::stream::iter(out)))
}
