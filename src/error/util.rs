//! Utility functions for error handling
//!
//! Helpers that turn filesystem failures into data load errors with the
//! offending path attached.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{MatchingError, Result};

/// Open an input file, reporting missing files and permission problems as
/// data load errors
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(MatchingError::data_load(
            path,
            format!("File not found (needed for {purpose})"),
        ));
    }

    if !path.is_file() {
        return Err(MatchingError::data_load(
            path,
            format!("Path is not a file (expected a file for {purpose})"),
        ));
    }

    fs::File::open(path).map_err(|e| {
        let message = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check file permissions".to_string()
            }
            io::ErrorKind::NotFound => {
                "File not found - it may have been deleted during operation".to_string()
            }
            _ => format!("Failed to open file for {purpose}: {e}"),
        };
        MatchingError::data_load(path, message)
    })
}

/// Attach the input path to a library error raised while decoding a file
pub fn with_load_context<T, E: std::fmt::Display>(
    result: std::result::Result<T, E>,
    path: &Path,
) -> Result<T> {
    result.map_err(|e| MatchingError::data_load(path, e.to_string()))
}
