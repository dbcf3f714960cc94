//! Parquet input

use std::path::Path;

use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;

use crate::error::util::{safe_open_file, with_load_context};
use crate::error::Result;

/// Read every batch of a Parquet file
///
/// # Arguments
/// * `path` - Parquet file to read
/// * `batch_size` - Rows per batch
pub fn read_parquet(path: &Path, batch_size: usize) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = safe_open_file(path, "population input")?;

    let builder = with_load_context(ParquetRecordBatchReaderBuilder::try_new(file), path)?;
    let schema = builder.schema().clone();
    let reader = with_load_context(builder.with_batch_size(batch_size).build(), path)?;

    let batches = with_load_context(reader.collect::<std::result::Result<Vec<_>, _>>(), path)?;

    Ok((schema, batches))
}
