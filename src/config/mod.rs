//! Configuration for loading a population and running a matching pass.

use serde::{Deserialize, Serialize};

/// Default batch size for CSV and Parquet readers
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Pool size from which the distance scan is spread over the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1000;

/// Read the reader batch size override from the environment
#[must_use]
pub fn batch_size_from_env() -> Option<usize> {
    std::env::var("COHORT_MATCH_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// Column names and status labels of the input table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Unique row identifier
    pub id_column: String,
    /// Categorical status label
    pub status_column: String,
    /// Ordered covariates used for the distance metric
    pub covariate_columns: Vec<String>,
    /// Status label of the treated cohort
    pub treated_label: String,
    /// Status label of the eligible control cohort
    pub control_label: String,
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self {
            id_column: "Patient_ID".to_string(),
            status_column: "Treatment_Status".to_string(),
            covariate_columns: vec![
                "Pain_Baseline".to_string(),
                "Urgency_Baseline".to_string(),
                "Frequency_Baseline".to_string(),
            ],
            treated_label: "Treated".to_string(),
            control_label: "Not Yet Treated".to_string(),
        }
    }
}

impl DatasetSchema {
    /// Every column the input table must contain
    #[must_use]
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.id_column.as_str(), self.status_column.as_str()];
        columns.extend(self.covariate_columns.iter().map(String::as_str));
        columns
    }

    /// Number of covariates
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.covariate_columns.len()
    }
}

/// Configuration for the matching process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Layout of the input table
    pub schema: DatasetSchema,

    /// Whether to evaluate distances in parallel for large control pools
    pub use_parallel: bool,

    /// Minimum pool size for the parallel scan
    pub parallel_threshold: usize,

    /// Whether to draw a progress bar over the treated cohort
    pub show_progress: bool,

    /// Rows per batch when reading input files
    pub batch_size: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            schema: DatasetSchema::default(),
            use_parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            show_progress: false,
            batch_size: batch_size_from_env().unwrap_or(DEFAULT_BATCH_SIZE),
        }
    }
}

impl MatchingConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing matching configuration
    #[must_use]
    pub fn builder() -> MatchingConfigBuilder {
        MatchingConfigBuilder::new()
    }

    /// Convert to a human-readable string representation
    #[must_use]
    pub fn to_string_representation(&self) -> String {
        format!(
            "Matching Configuration:\n\
             - Id column: {}\n\
             - Status column: {}\n\
             - Covariates: {}\n\
             - Treated label: {}\n\
             - Control label: {}\n\
             - Parallel scan: {} (threshold {})",
            self.schema.id_column,
            self.schema.status_column,
            self.schema.covariate_columns.join(", "),
            self.schema.treated_label,
            self.schema.control_label,
            self.use_parallel,
            self.parallel_threshold
        )
    }
}

/// Builder for constructing matching configuration
#[derive(Debug, Clone)]
pub struct MatchingConfigBuilder {
    config: MatchingConfig,
}

impl Default for MatchingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MatchingConfig::default(),
        }
    }

    /// Set the full dataset schema
    #[must_use]
    pub fn schema(mut self, schema: DatasetSchema) -> Self {
        self.config.schema = schema;
        self
    }

    /// Set the id column
    #[must_use]
    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.config.schema.id_column = column.into();
        self
    }

    /// Set the status column
    #[must_use]
    pub fn status_column(mut self, column: impl Into<String>) -> Self {
        self.config.schema.status_column = column.into();
        self
    }

    /// Set the ordered covariate columns
    #[must_use]
    pub fn covariate_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.schema.covariate_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the treated and control status labels
    #[must_use]
    pub fn labels(mut self, treated: impl Into<String>, control: impl Into<String>) -> Self {
        self.config.schema.treated_label = treated.into();
        self.config.schema.control_label = control.into();
        self
    }

    /// Set whether to use parallel processing
    #[must_use]
    pub const fn use_parallel(mut self, parallel: bool) -> Self {
        self.config.use_parallel = parallel;
        self
    }

    /// Set the pool size from which the scan runs in parallel
    #[must_use]
    pub const fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_threshold = threshold;
        self
    }

    /// Set whether to show a progress bar
    #[must_use]
    pub const fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Set the reader batch size
    #[must_use]
    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Build the matching configuration
    #[must_use]
    pub fn build(self) -> MatchingConfig {
        self.config
    }
}
