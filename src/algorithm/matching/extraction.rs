//! Data extraction utilities for the matching algorithm
//!
//! This module turns an Arrow `RecordBatch` into a `Population`, casting the
//! id and status columns to strings and the covariates to `f64`.

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::algorithm::matching::types::{Population, Unit};
use crate::algorithm::matching::validation::{validate_batch, validate_schema};
use crate::config::DatasetSchema;
use crate::error::{MatchingError, Result};

/// Cast a named column to the requested type
fn column_as(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| MatchingError::MissingColumn(name.to_string()))?;
    Ok(cast(batch.column(idx), to)?)
}

fn as_strings(array: &ArrayRef, name: &str) -> Result<StringArray> {
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| MatchingError::InvalidSchema(format!("column '{name}' is not text")))
}

fn as_floats(array: &ArrayRef, name: &str) -> Result<Float64Array> {
    array
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| MatchingError::InvalidSchema(format!("column '{name}' is not numeric")))
}

/// Extract a population from a record batch
///
/// Every row becomes a unit, whatever its status label. A null status is read
/// as an empty label and so joins neither cohort. Covariates that are null,
/// cannot be parsed as numbers, or are not finite fail the whole load.
///
/// # Errors
/// Returns `MissingColumn` for an absent column, `MissingId` for a null id,
/// `InvalidCovariate` for a bad covariate value and `DuplicateId` for a
/// repeated id.
pub fn extract_population(batch: &RecordBatch, schema: &DatasetSchema) -> Result<Population> {
    validate_schema(schema)?;
    validate_batch(batch, schema)?;

    let ids = as_strings(
        &column_as(batch, &schema.id_column, &DataType::Utf8)?,
        &schema.id_column,
    )?;
    let statuses = as_strings(
        &column_as(batch, &schema.status_column, &DataType::Utf8)?,
        &schema.status_column,
    )?;

    let covariates = schema
        .covariate_columns
        .iter()
        .map(|name| as_floats(&column_as(batch, name, &DataType::Float64)?, name))
        .collect::<Result<Vec<_>>>()?;

    let mut units = Vec::with_capacity(batch.num_rows());

    for row in 0..batch.num_rows() {
        if ids.is_null(row) {
            return Err(MatchingError::MissingId { row });
        }
        let id = ids.value(row).to_string();

        let status = if statuses.is_null(row) {
            String::new()
        } else {
            statuses.value(row).to_string()
        };

        let mut values = Vec::with_capacity(covariates.len());
        for (column, array) in schema.covariate_columns.iter().zip(&covariates) {
            if array.is_null(row) || !array.value(row).is_finite() {
                return Err(MatchingError::InvalidCovariate {
                    id,
                    column: column.clone(),
                });
            }
            values.push(array.value(row));
        }

        units.push(Unit::new(id, status, values));
    }

    debug!(
        "Extracted {} units with {} covariates",
        units.len(),
        schema.covariate_columns.len()
    );

    Population::new(schema.covariate_columns.clone(), units)
}
