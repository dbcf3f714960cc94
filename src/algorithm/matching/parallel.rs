//! Parallel nearest-control scan
//!
//! Distances to the available controls are evaluated on the rayon pool. The
//! reduction keeps the smallest distance and, among equal distances, the
//! smallest pool position, so the selection matches the sequential scan.

use rayon::prelude::*;

use crate::algorithm::matching::control_pool::ControlPool;
use crate::algorithm::matching::covariance::InverseCovariance;
use crate::algorithm::matching::distance::mahalanobis_squared;
use crate::algorithm::matching::sequential::Candidate;

/// Find the nearest available control, evaluating distances in parallel
#[must_use]
pub fn nearest_control_parallel(
    treated: &[f64],
    pool: &ControlPool,
    inv_cov: &InverseCovariance,
) -> Option<Candidate> {
    let positions = pool.available_positions();
    let dimension = pool.dimension();

    positions
        .par_iter()
        .map_init(
            || vec![0.0; dimension],
            |diff, &position| Candidate {
                position,
                distance: mahalanobis_squared(treated, pool.covariates(position), inv_cov, diff)
                    .sqrt(),
            },
        )
        .reduce_with(|a, b| if b.beats(&a) { b } else { a })
}
