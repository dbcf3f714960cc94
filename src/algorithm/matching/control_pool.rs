//! Control pool for the matching algorithm
//!
//! Controls are stored struct-of-arrays style: ids in one vector and all
//! covariates in one contiguous row-major buffer. The set of controls still
//! available is an ordered set of positions into those arrays, so removal is
//! O(log n) and iteration always follows the original control order.

use std::collections::BTreeSet;

use crate::algorithm::matching::types::Unit;

/// Pool of unmatched controls
#[derive(Debug, Clone)]
pub struct ControlPool {
    /// Control ids in cohort order
    ids: Vec<String>,
    /// Row-major covariates, `dimension` values per control
    covariates: Vec<f64>,
    /// Number of covariates per control
    dimension: usize,
    /// Positions of controls still available
    available: BTreeSet<usize>,
}

impl ControlPool {
    /// Build a pool holding every control of the cohort
    ///
    /// The cohort itself is only read.
    #[must_use]
    pub fn new(controls: &[Unit], dimension: usize) -> Self {
        let mut ids = Vec::with_capacity(controls.len());
        let mut covariates = Vec::with_capacity(controls.len() * dimension);
        for unit in controls {
            ids.push(unit.id.clone());
            covariates.extend_from_slice(&unit.covariates);
        }

        Self {
            ids,
            covariates,
            dimension,
            available: (0..controls.len()).collect(),
        }
    }

    /// Id of the control at a position
    #[must_use]
    pub fn id(&self, position: usize) -> &str {
        &self.ids[position]
    }

    /// Covariates of the control at a position
    #[must_use]
    pub fn covariates(&self, position: usize) -> &[f64] {
        let start = position * self.dimension;
        &self.covariates[start..start + self.dimension]
    }

    /// Available positions in cohort order
    pub fn available(&self) -> impl Iterator<Item = usize> + '_ {
        self.available.iter().copied()
    }

    /// Available positions collected for a parallel scan
    #[must_use]
    pub fn available_positions(&self) -> Vec<usize> {
        self.available.iter().copied().collect()
    }

    /// Remove the control at a position, returning whether it was available
    pub fn take(&mut self, position: usize) -> bool {
        self.available.remove(&position)
    }

    /// Number of controls still available
    #[must_use]
    pub fn len(&self) -> usize {
        self.available.len()
    }

    /// Check if every control has been taken
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    /// Number of covariates per control
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }
}
