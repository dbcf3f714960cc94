//! Error handling for the matching pipeline.

use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

pub mod util;

/// Errors produced while loading a population or running a matching pass
#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    /// The input could not be read into the expected tabular shape
    #[error("Failed to load data from {}: {message}", path.display())]
    DataLoad { path: PathBuf, message: String },

    /// A column the dataset schema requires is absent from the table
    #[error("Required column '{0}' not found")]
    MissingColumn(String),

    /// The configured dataset schema is unusable
    #[error("Invalid dataset schema: {0}")]
    InvalidSchema(String),

    /// A row has no identifier
    #[error("Row {row} has no value in the id column")]
    MissingId { row: usize },

    /// Two rows share the same identifier
    #[error("Duplicate unit id '{0}'")]
    DuplicateId(String),

    /// A covariate value is null, non-numeric or non-finite
    #[error("Invalid value for covariate '{column}' in unit '{id}'")]
    InvalidCovariate { id: String, column: String },

    /// The sample covariance matrix cannot be inverted
    #[error("Covariance matrix is singular: {reason}")]
    SingularCovariance { reason: String },

    /// Covariate vectors and the inverse covariance matrix disagree on dimension
    #[error("Dimension mismatch: expected {expected} covariates, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Error raised by Arrow compute or CSV reading
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error raised while decoding Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatchingError {
    /// Create a data load error for the given path
    pub fn data_load(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a singular covariance error
    pub fn singular(reason: impl Into<String>) -> Self {
        Self::SingularCovariance {
            reason: reason.into(),
        }
    }

    /// Whether this error arose while turning input into a population.
    ///
    /// Load failures never produce a context, so a caller holding an earlier
    /// context can keep using it.
    #[must_use]
    pub const fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::DataLoad { .. }
                | Self::MissingColumn(_)
                | Self::InvalidSchema(_)
                | Self::MissingId { .. }
                | Self::DuplicateId(_)
                | Self::InvalidCovariate { .. }
                | Self::Arrow(_)
                | Self::Parquet(_)
                | Self::Io(_)
        )
    }
}

/// Result type for matching operations
pub type Result<T> = std::result::Result<T, MatchingError>;
