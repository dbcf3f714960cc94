//! Type definitions for the matching algorithm
//!
//! This module contains the population, cohort and result types shared by
//! the estimator, the partitioner and the matcher.

use std::time::Duration;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{MatchingError, Result};

/// One row of the input population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier
    pub id: String,
    /// Status label
    pub status: String,
    /// Covariate values in the population's feature order
    pub covariates: Vec<f64>,
}

impl Unit {
    /// Create a new unit
    pub fn new(id: impl Into<String>, status: impl Into<String>, covariates: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            covariates,
        }
    }
}

/// The full ordered set of units and the names of their covariates
#[derive(Debug, Clone)]
pub struct Population {
    covariate_names: Vec<String>,
    units: Vec<Unit>,
}

impl Population {
    /// Create a population, checking covariate dimensions and id uniqueness
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if a unit has the wrong number of covariates,
    /// `DuplicateId` if two units share an id, and `InvalidCovariate` for a
    /// non-finite value.
    pub fn new(covariate_names: Vec<String>, units: Vec<Unit>) -> Result<Self> {
        let k = covariate_names.len();
        {
            let mut seen = FxHashSet::default();
            seen.reserve(units.len());

            for unit in &units {
                if unit.covariates.len() != k {
                    return Err(MatchingError::DimensionMismatch {
                        expected: k,
                        found: unit.covariates.len(),
                    });
                }
                if let Some(pos) = unit.covariates.iter().position(|v| !v.is_finite()) {
                    return Err(MatchingError::InvalidCovariate {
                        id: unit.id.clone(),
                        column: covariate_names[pos].clone(),
                    });
                }
                if !seen.insert(unit.id.as_str()) {
                    return Err(MatchingError::DuplicateId(unit.id.clone()));
                }
            }
        }

        Ok(Self {
            covariate_names,
            units,
        })
    }

    /// Ordered covariate names
    #[must_use]
    pub fn covariate_names(&self) -> &[String] {
        &self.covariate_names
    }

    /// Number of covariates per unit
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.covariate_names.len()
    }

    /// All units in input order
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Number of units
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the population is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Treated and control subsets of a population, in input order
#[derive(Debug, Clone, Default)]
pub struct Cohorts {
    /// Units carrying the treated label
    pub treated: Vec<Unit>,
    /// Units carrying the eligible control label
    pub control: Vec<Unit>,
}

/// Pair of matched treated unit and control unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    /// Treated unit id
    pub treated_id: String,
    /// Control unit id
    pub control_id: String,
    /// Mahalanobis distance between the two units
    pub distance: f64,
}

/// Notice that the control pool ran dry before every treated unit was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhaustedControlPool {
    /// Treated units left without a control
    pub unmatched_treated: usize,
}

impl std::fmt::Display for ExhaustedControlPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "No more control patients available for matching ({} treated left unmatched)",
            self.unmatched_treated
        )
    }
}

/// Result of the matching process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingResult {
    /// Matched pairs in treated-cohort order
    pub pairs: Vec<MatchedPair>,
    /// Set when the control pool was exhausted
    pub exhausted: Option<ExhaustedControlPool>,
    /// Time taken for matching
    #[serde(skip)]
    pub matching_time: Duration,
}

impl MatchingResult {
    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if no pair was made
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over `(treated_id, control_id)` pairs
    pub fn id_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|p| (p.treated_id.as_str(), p.control_id.as_str()))
    }

    /// Sum of the pair distances
    #[must_use]
    pub fn total_distance(&self) -> f64 {
        self.pairs.iter().map(|p| p.distance).sum()
    }
}
