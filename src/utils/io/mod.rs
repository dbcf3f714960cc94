//! Tabular input for the matching pipeline
//!
//! Input files are read into a single Arrow `RecordBatch`, dispatching on the
//! file extension.

use std::path::Path;
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;

use crate::error::{MatchingError, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start};

pub mod csv_reader;
pub mod parquet_reader;
pub mod writer;

pub use csv_reader::read_csv;
pub use parquet_reader::read_parquet;
pub use writer::{result_to_batch, write_pairs_csv};

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Detect the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// Load a CSV or Parquet file into one record batch
///
/// # Errors
/// Returns a data load error if the extension is not recognised, the file
/// cannot be parsed, or it contains no rows
pub fn load_table(path: &Path, batch_size: usize) -> Result<RecordBatch> {
    let format = TableFormat::from_path(path).ok_or_else(|| {
        MatchingError::data_load(path, "Unsupported file extension (expected .csv or .parquet)")
    })?;

    log_operation_start("Loading population from", path);
    let start = Instant::now();

    let (schema, batches) = match format {
        TableFormat::Csv => read_csv(path, batch_size)?,
        TableFormat::Parquet => read_parquet(path, batch_size)?,
    };

    let batch = concat_batches(&schema, &batches)
        .map_err(|e| MatchingError::data_load(path, format!("Failed to combine batches: {e}")))?;

    if batch.num_rows() == 0 {
        return Err(MatchingError::data_load(path, "File contains no rows"));
    }

    log_operation_complete("loaded", path, batch.num_rows(), Some(start.elapsed()));

    Ok(batch)
}
