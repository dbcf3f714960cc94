//! Covariance estimation for the Mahalanobis metric
//!
//! The sample covariance of the covariates is computed once over the whole
//! population, inverted, and then shared read-only by every distance
//! evaluation of a matching pass.

use log::{debug, info};
use nalgebra::{DMatrix, SymmetricEigen};

use crate::algorithm::matching::types::Population;
use crate::error::{MatchingError, Result};

/// Smallest accepted ratio between the smallest and largest eigenvalue of the
/// correlation matrix
pub const CONDITION_TOLERANCE: f64 = 1e-10;

/// Inverse of the sample covariance matrix of the covariates
#[derive(Debug, Clone, PartialEq)]
pub struct InverseCovariance {
    matrix: DMatrix<f64>,
}

impl InverseCovariance {
    /// Wrap an already inverted k×k matrix
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the matrix is not square and
    /// `SingularCovariance` if it holds non-finite entries.
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self> {
        if matrix.nrows() != matrix.ncols() {
            return Err(MatchingError::DimensionMismatch {
                expected: matrix.nrows(),
                found: matrix.ncols(),
            });
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(MatchingError::singular("inverse contains non-finite entries"));
        }
        Ok(Self { matrix })
    }

    /// Identity metric, under which the Mahalanobis distance is Euclidean
    #[must_use]
    pub fn identity(k: usize) -> Self {
        Self {
            matrix: DMatrix::identity(k, k),
        }
    }

    /// Number of covariates the matrix applies to
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    /// The underlying matrix
    #[must_use]
    pub const fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Evaluate `dᵀ Σ⁻¹ d` for a difference vector of length k
    #[inline]
    #[must_use]
    pub fn quadratic_form(&self, diff: &[f64]) -> f64 {
        let k = self.dimension();
        debug_assert_eq!(diff.len(), k, "difference vector has the wrong dimension");
        let mut acc = 0.0;
        for i in 0..k {
            let mut row = 0.0;
            for j in 0..k {
                row += self.matrix[(i, j)] * diff[j];
            }
            acc += diff[i] * row;
        }
        acc
    }
}

/// Sample covariance with the n−1 divisor
///
/// # Errors
/// Returns `SingularCovariance` for fewer than two units, since the estimator
/// is undefined there.
pub fn sample_covariance(population: &Population) -> Result<DMatrix<f64>> {
    let n = population.len();
    let k = population.dimension();

    if n < 2 {
        return Err(MatchingError::singular(format!(
            "covariance needs at least 2 units, got {n}"
        )));
    }

    let mut mean = vec![0.0; k];
    for unit in population.units() {
        for (m, v) in mean.iter_mut().zip(&unit.covariates) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= n as f64;
    }

    let mut cov = DMatrix::<f64>::zeros(k, k);
    for unit in population.units() {
        for i in 0..k {
            let di = unit.covariates[i] - mean[i];
            for j in i..k {
                cov[(i, j)] += di * (unit.covariates[j] - mean[j]);
            }
        }
    }

    let denom = (n - 1) as f64;
    for i in 0..k {
        for j in i..k {
            let value = cov[(i, j)] / denom;
            cov[(i, j)] = value;
            cov[(j, i)] = value;
        }
    }

    Ok(cov)
}

/// Invert a symmetric covariance matrix, rejecting singular ones
///
/// Conditioning is judged on the correlation matrix `R = D^-1/2 · Σ · D^-1/2`
/// with `D = diag(Σ)`, so rescaling a covariate never changes the verdict.
/// A covariate with zero variance is singular outright. Otherwise `R` is
/// inverted from its eigen-decomposition, `V · diag(1/λ) · Vᵀ`, and scaled
/// back: `Σ⁻¹ = D^-1/2 · R⁻¹ · D^-1/2`. `R` is singular when its smallest
/// eigenvalue is not positive or is negligible next to the largest.
pub fn invert_covariance(cov: &DMatrix<f64>) -> Result<InverseCovariance> {
    let k = cov.nrows();
    if k == 0 {
        return Err(MatchingError::singular("no covariates"));
    }

    let variances = cov.diagonal();
    if let Some(i) = variances.iter().position(|v| !v.is_finite() || *v <= 0.0) {
        return Err(MatchingError::singular(format!(
            "covariate {i} has zero variance"
        )));
    }

    let inv_sd = variances.map(|v| 1.0 / v.sqrt());
    let scale = DMatrix::from_diagonal(&inv_sd);
    let corr = &scale * cov * &scale;

    let eigen = SymmetricEigen::new(corr);
    let max_eigen = eigen.eigenvalues.max();
    let min_eigen = eigen.eigenvalues.min();

    debug!("Correlation eigenvalues range [{min_eigen:e}, {max_eigen:e}]");

    if !max_eigen.is_finite() || max_eigen <= 0.0 {
        return Err(MatchingError::singular("correlation matrix is not positive"));
    }
    if min_eigen <= max_eigen * CONDITION_TOLERANCE {
        return Err(MatchingError::singular(format!(
            "covariates are collinear (correlation eigenvalue ratio {:e})",
            min_eigen / max_eigen
        )));
    }

    let inv_eigen = DMatrix::from_diagonal(&eigen.eigenvalues.map(|l| 1.0 / l));
    let vectors = &eigen.eigenvectors;
    let inv_corr = vectors * inv_eigen * vectors.transpose();
    let inverse = &scale * inv_corr * &scale;
    let symmetric = (&inverse + inverse.transpose()) * 0.5;

    InverseCovariance::from_matrix(symmetric)
}

/// Estimate the inverse covariance matrix of a population's covariates
///
/// Every unit contributes, including those whose status places them in
/// neither cohort.
///
/// # Errors
/// Returns `SingularCovariance` when the covariance matrix cannot be inverted,
/// including when there are fewer than k+1 units.
pub fn estimate(population: &Population) -> Result<InverseCovariance> {
    let n = population.len();
    let k = population.dimension();

    if n < k + 1 {
        return Err(MatchingError::singular(format!(
            "{n} units cannot determine a covariance over {k} covariates"
        )));
    }

    for (i, name) in population.covariate_names().iter().enumerate() {
        let mut values = population.units().iter().map(|u| u.covariates[i]);
        if let Some(first) = values.next() {
            if values.all(|v| v == first) {
                return Err(MatchingError::singular(format!(
                    "covariate '{name}' is constant"
                )));
            }
        }
    }

    let cov = sample_covariance(population)?;
    let inverse = invert_covariance(&cov)?;

    info!(
        "Estimated inverse covariance over {} covariates from {} units",
        k, n
    );

    Ok(inverse)
}
