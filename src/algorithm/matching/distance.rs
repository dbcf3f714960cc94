//! Mahalanobis distance between covariate vectors

use crate::algorithm::matching::covariance::InverseCovariance;

/// Squared Mahalanobis distance, `(x−y)ᵀ Σ⁻¹ (x−y)`
///
/// `diff` is scratch space of length k, reused across calls to avoid an
/// allocation per evaluation. `x` and `y` must have length k as well.
#[inline]
pub fn mahalanobis_squared(
    x: &[f64],
    y: &[f64],
    inv_cov: &InverseCovariance,
    diff: &mut [f64],
) -> f64 {
    debug_assert_eq!(x.len(), diff.len());
    debug_assert_eq!(y.len(), diff.len());
    for ((d, a), b) in diff.iter_mut().zip(x).zip(y) {
        *d = a - b;
    }
    // Rounding can push a zero form slightly negative
    inv_cov.quadratic_form(diff).max(0.0)
}

/// Mahalanobis distance, `sqrt((x−y)ᵀ Σ⁻¹ (x−y))`
///
/// # Panics
/// Panics if `x` or `y` does not have one value per covariate of `inv_cov`.
#[must_use]
pub fn mahalanobis(x: &[f64], y: &[f64], inv_cov: &InverseCovariance) -> f64 {
    let k = inv_cov.dimension();
    assert!(
        x.len() == k && y.len() == k,
        "expected {k} covariates, got {} and {}",
        x.len(),
        y.len()
    );
    let mut diff = vec![0.0; k];
    mahalanobis_squared(x, y, inv_cov, &mut diff).sqrt()
}
