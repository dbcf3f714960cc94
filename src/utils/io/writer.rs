//! Output of matched pairs
//!
//! Pairs are converted to an Arrow `RecordBatch` with the two display columns
//! plus the match distance, and written with the Arrow CSV writer.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, Schema};

use crate::algorithm::matching::types::MatchingResult;
use crate::error::Result;

/// Column holding the treated unit id
pub const TREATED_ID_COLUMN: &str = "Treated_Patient_ID";
/// Column holding the matched control id
pub const CONTROL_ID_COLUMN: &str = "Matched_Control_Patient_ID";
/// Column holding the pair distance
pub const DISTANCE_COLUMN: &str = "Mahalanobis_Distance";

/// Convert matched pairs to a record batch, one row per pair
pub fn result_to_batch(result: &MatchingResult) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(TREATED_ID_COLUMN, DataType::Utf8, false),
        Field::new(CONTROL_ID_COLUMN, DataType::Utf8, false),
        Field::new(DISTANCE_COLUMN, DataType::Float64, false),
    ]));

    let treated: StringArray = result.pairs.iter().map(|p| Some(p.treated_id.as_str())).collect();
    let control: StringArray = result.pairs.iter().map(|p| Some(p.control_id.as_str())).collect();
    let distance: Float64Array = result.pairs.iter().map(|p| Some(p.distance)).collect();

    Ok(RecordBatch::try_new(
        schema,
        vec![Arc::new(treated), Arc::new(control), Arc::new(distance)],
    )?)
}

/// Write matched pairs to a CSV file with a header row
pub fn write_pairs_csv(result: &MatchingResult, path: &Path) -> Result<()> {
    let batch = result_to_batch(result)?;
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(&batch)?;
    Ok(())
}
