//! Sequential nearest-control scan
//!
//! Walks the pool in cohort order and keeps the first control with the
//! strictly smallest distance.

use crate::algorithm::matching::control_pool::ControlPool;
use crate::algorithm::matching::covariance::InverseCovariance;
use crate::algorithm::matching::distance::mahalanobis_squared;

/// Control selected for a treated unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position of the control in the pool
    pub position: usize,
    /// Mahalanobis distance to the treated unit
    pub distance: f64,
}

impl Candidate {
    /// Whether `self` should replace `best` under the first-minimum rule
    ///
    /// Positions are only compared on equal distances, which keeps the result
    /// independent of the order in which candidates are combined.
    #[inline]
    #[must_use]
    pub fn beats(&self, best: &Self) -> bool {
        self.distance < best.distance
            || (self.distance == best.distance && self.position < best.position)
    }
}

/// Find the nearest available control, scanning the pool in order
#[must_use]
pub fn nearest_control_sequential(
    treated: &[f64],
    pool: &ControlPool,
    inv_cov: &InverseCovariance,
) -> Option<Candidate> {
    let mut diff = vec![0.0; pool.dimension()];
    let mut best: Option<Candidate> = None;

    for position in pool.available() {
        let distance = mahalanobis_squared(treated, pool.covariates(position), inv_cov, &mut diff).sqrt();
        let candidate = Candidate { position, distance };

        if best.is_none_or(|current| candidate.beats(&current)) {
            best = Some(candidate);
        }
    }

    best
}
