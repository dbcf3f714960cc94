//! Core matching algorithm implementation
//!
//! This module implements the Matcher struct which runs the greedy,
//! without-replacement nearest-neighbour pass over the treated cohort.

use std::time::Instant;

use log::{debug, info, warn};

use crate::algorithm::matching::control_pool::ControlPool;
use crate::algorithm::matching::covariance::InverseCovariance;
use crate::algorithm::matching::parallel::nearest_control_parallel;
use crate::algorithm::matching::sequential::{Candidate, nearest_control_sequential};
use crate::algorithm::matching::types::{ExhaustedControlPool, MatchedPair, MatchingResult, Unit};
use crate::config::MatchingConfig;
use crate::error::{MatchingError, Result};
use crate::utils::logging::{finish_progress_bar, progress_bar_if};

/// Matcher for pairing treated units with controls
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    /// Matching configuration
    config: MatchingConfig,
}

impl Matcher {
    /// Create a new matcher with the given configuration
    #[must_use]
    pub const fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// The matcher's configuration
    #[must_use]
    pub const fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Pair each treated unit with its nearest unmatched control
    ///
    /// Treated units are visited in order. Each takes the control with the
    /// smallest Mahalanobis distance among those still in the pool (the first
    /// one in control order on ties), and that control is removed from the
    /// pool. When the pool runs dry the pass stops and the outcome carries an
    /// `ExhaustedControlPool` notice. The control cohort is never modified.
    ///
    /// # Arguments
    ///
    /// * `treated` - Treated cohort, in matching order
    /// * `control` - Control cohort
    /// * `inv_cov` - Inverse covariance matrix shared by every evaluation
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if any unit's covariate count differs from
    /// the dimension of `inv_cov`.
    pub fn perform_matching(
        &self,
        treated: &[Unit],
        control: &[Unit],
        inv_cov: &InverseCovariance,
    ) -> Result<MatchingResult> {
        let start_time = Instant::now();
        let dimension = inv_cov.dimension();

        if let Some(unit) = treated
            .iter()
            .chain(control)
            .find(|u| u.covariates.len() != dimension)
        {
            return Err(MatchingError::DimensionMismatch {
                expected: dimension,
                found: unit.covariates.len(),
            });
        }

        info!(
            "Matching {} treated units with control pool of {} candidates",
            treated.len(),
            control.len()
        );

        let mut pool = ControlPool::new(control, dimension);
        let mut pairs = Vec::with_capacity(treated.len().min(control.len()));
        let mut exhausted = None;

        let pb = progress_bar_if(
            self.config.show_progress,
            treated.len() as u64,
            Some("Greedy matching"),
        );

        for (idx, unit) in treated.iter().enumerate() {
            if pool.is_empty() {
                let notice = ExhaustedControlPool {
                    unmatched_treated: treated.len() - idx,
                };
                warn!("{notice}");
                exhausted = Some(notice);
                break;
            }

            let Some(best) = self.nearest_control(&unit.covariates, &pool, inv_cov) else {
                break;
            };

            pool.take(best.position);
            debug!(
                "Matched {} -> {} (distance {:.4})",
                unit.id,
                pool.id(best.position),
                best.distance
            );

            pairs.push(MatchedPair {
                treated_id: unit.id.clone(),
                control_id: pool.id(best.position).to_string(),
                distance: best.distance,
            });

            pb.inc(1);
            if idx % 100 == 0 {
                pb.set_message(format!("Found {} matches", pairs.len()));
            }
        }

        finish_progress_bar(&pb, Some("Matching complete"));

        let elapsed = start_time.elapsed();
        info!(
            "Matching complete: {} pairs in {:.2?} ({:.2} treated/sec)",
            pairs.len(),
            elapsed,
            pairs.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
        );

        Ok(MatchingResult {
            pairs,
            exhausted,
            matching_time: elapsed,
        })
    }

    fn nearest_control(
        &self,
        treated: &[f64],
        pool: &ControlPool,
        inv_cov: &InverseCovariance,
    ) -> Option<Candidate> {
        if self.config.use_parallel && pool.len() >= self.config.parallel_threshold {
            nearest_control_parallel(treated, pool, inv_cov)
        } else {
            nearest_control_sequential(treated, pool, inv_cov)
        }
    }
}

/// Run a greedy matching pass with the default configuration
pub fn match_cohorts(
    treated: &[Unit],
    control: &[Unit],
    inv_cov: &InverseCovariance,
) -> Result<MatchingResult> {
    Matcher::default().perform_matching(treated, control, inv_cov)
}
