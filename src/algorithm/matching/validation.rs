//! Validation functions for the matching algorithm
//!
//! This module contains functions for validating input data before matching.

use arrow::record_batch::RecordBatch;

use crate::config::DatasetSchema;
use crate::error::{MatchingError, Result};

/// Validate that the input batch has every column the schema names
pub fn validate_batch(batch: &RecordBatch, schema: &DatasetSchema) -> Result<()> {
    let batch_schema = batch.schema();

    for column in schema.required_columns() {
        if batch_schema.field_with_name(column).is_err() {
            return Err(MatchingError::MissingColumn(column.to_string()));
        }
    }

    Ok(())
}

/// Validate that the schema names at least one covariate and no column twice
pub fn validate_schema(schema: &DatasetSchema) -> Result<()> {
    if schema.covariate_columns.is_empty() {
        return Err(MatchingError::InvalidSchema(
            "at least one covariate column is required".to_string(),
        ));
    }

    let columns = schema.required_columns();
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].contains(column) {
            return Err(MatchingError::InvalidSchema(format!(
                "column '{column}' is named more than once"
            )));
        }
    }

    Ok(())
}
