//! CSV input
//!
//! Reads a headed CSV file into Arrow record batches, inferring column types
//! from the file contents.

use std::io::{BufReader, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;

use crate::error::util::{safe_open_file, with_load_context};
use crate::error::Result;

/// Read every batch of a CSV file with a header row
///
/// # Arguments
/// * `path` - CSV file to read
/// * `batch_size` - Rows per batch
///
/// # Returns
/// The inferred schema and the batches read from the file
pub fn read_csv(path: &Path, batch_size: usize) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = safe_open_file(path, "population input")?;
    let mut reader = BufReader::new(file);

    let format = Format::default().with_header(true);
    let (schema, _) = with_load_context(format.infer_schema(&mut reader, None), path)?;
    let schema = Arc::new(schema);

    reader.rewind()?;

    let csv_reader = with_load_context(
        ReaderBuilder::new(Arc::clone(&schema))
            .with_format(format)
            .with_batch_size(batch_size)
            .build(reader),
        path,
    )?;

    let batches = with_load_context(csv_reader.collect::<std::result::Result<Vec<_>, _>>(), path)?;

    Ok((schema, batches))
}
