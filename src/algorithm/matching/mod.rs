//! Greedy Mahalanobis matching of treated units to controls
//!
//! This module implements the matching pipeline:
//!
//! 1. Extraction of a population from tabular input
//! 2. Inverse covariance estimation over the whole population
//! 3. Partitioning into treated and control cohorts
//! 4. Greedy, without-replacement nearest-neighbour matching
//! 5. Covariate balance assessment for the matched pairs
//!
//! Matching is deterministic: the same inputs always produce the same pairs
//! in the same order, whether or not the distance scan runs in parallel.

pub mod balance;
pub mod context;
pub mod control_pool;
pub mod covariance;
pub mod distance;
pub mod extraction;
pub mod matcher;
pub mod parallel;
pub mod partition;
pub mod sequential;
pub mod types;
pub mod validation;

// Re-export key types
pub use balance::{BalanceCalculator, BalanceMetric, BalanceReport, BalanceSummary, PairedCovariate};
pub use context::MatchingContext;
pub use covariance::{InverseCovariance, estimate};
pub use distance::mahalanobis;
pub use extraction::extract_population;
pub use matcher::{Matcher, match_cohorts};
pub use partition::partition;
pub use types::{Cohorts, ExhaustedControlPool, MatchedPair, MatchingResult, Population, Unit};
