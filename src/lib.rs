//! Greedy Mahalanobis matching of treated units to not-yet-treated controls.
//!
//! A dataset is loaded once into a [`MatchingContext`], which estimates the
//! inverse covariance of the covariates over the whole population and splits
//! it into treated and control cohorts. Each call to [`MatchingContext::run`]
//! then pairs every treated unit, in order, with its nearest remaining
//! control.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod utils;

// Re-export the most common types for easier use
pub use config::{DatasetSchema, MatchingConfig};
pub use error::{MatchingError, Result};

pub use algorithm::matching::{
    BalanceCalculator, BalanceReport, Cohorts, ExhaustedControlPool, InverseCovariance,
    MatchedPair, Matcher, MatchingContext, MatchingResult, PairedCovariate, Population, Unit,
    estimate, extract_population, mahalanobis, match_cohorts, partition,
};

pub use utils::io::{load_table, write_pairs_csv};
