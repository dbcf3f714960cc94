//! Per-load matching context
//!
//! A `MatchingContext` holds everything derived from one loaded dataset: the
//! population, its inverse covariance matrix and the two cohorts. It is built
//! once, never mutated, and passed by reference to every matching pass. A
//! failed load returns an error and leaves any earlier context untouched.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use log::info;

use crate::algorithm::matching::balance::{PairedCovariate, paired_values};
use crate::algorithm::matching::covariance::{self, InverseCovariance};
use crate::algorithm::matching::extraction::extract_population;
use crate::algorithm::matching::matcher::Matcher;
use crate::algorithm::matching::partition::partition;
use crate::algorithm::matching::types::{Cohorts, MatchingResult, Population};
use crate::config::MatchingConfig;
use crate::error::Result;
use crate::utils::io::load_table;

/// Immutable state shared by the matching passes over one dataset
#[derive(Debug, Clone)]
pub struct MatchingContext {
    config: MatchingConfig,
    population: Population,
    inv_cov: InverseCovariance,
    cohorts: Cohorts,
}

impl MatchingContext {
    /// Load a CSV or Parquet file and build a context from it
    pub fn load(path: &Path, config: MatchingConfig) -> Result<Self> {
        let batch = load_table(path, config.batch_size)?;
        Self::from_batch(&batch, config)
    }

    /// Build a context from an in-memory record batch
    pub fn from_batch(batch: &RecordBatch, config: MatchingConfig) -> Result<Self> {
        let population = extract_population(batch, &config.schema)?;
        Self::from_population(population, config)
    }

    /// Build a context from an already extracted population
    ///
    /// The inverse covariance matrix is estimated here, over the whole
    /// population, and reused by every later pass.
    pub fn from_population(population: Population, config: MatchingConfig) -> Result<Self> {
        let inv_cov = covariance::estimate(&population)?;
        let cohorts = partition(&population, &config.schema);

        info!(
            "Matching context ready: {} units, {} treated, {} control",
            population.len(),
            cohorts.treated.len(),
            cohorts.control.len()
        );

        Ok(Self {
            config,
            population,
            inv_cov,
            cohorts,
        })
    }

    /// Run a greedy matching pass over the context's cohorts
    pub fn run(&self) -> Result<MatchingResult> {
        Matcher::new(self.config.clone()).perform_matching(
            &self.cohorts.treated,
            &self.cohorts.control,
            &self.inv_cov,
        )
    }

    /// Join covariate values of the matched pairs for a balance check
    #[must_use]
    pub fn paired_values(&self, result: &MatchingResult) -> Vec<PairedCovariate> {
        paired_values(&self.cohorts, self.population.covariate_names(), result)
    }

    /// Configuration the context was built with
    #[must_use]
    pub const fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// The loaded population
    #[must_use]
    pub const fn population(&self) -> &Population {
        &self.population
    }

    /// Inverse covariance matrix of the population
    #[must_use]
    pub const fn inverse_covariance(&self) -> &InverseCovariance {
        &self.inv_cov
    }

    /// Treated and control cohorts
    #[must_use]
    pub const fn cohorts(&self) -> &Cohorts {
        &self.cohorts
    }
}
