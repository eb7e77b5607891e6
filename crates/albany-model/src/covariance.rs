//! Sample covariance of residual panels.
//!
//! Residuals are arranged one observation per row and one series per
//! column; the estimate uses the unbiased `T - 1` divisor.

use ndarray::{Array2, Axis};
use thiserror::Error;

/// Errors that can occur during covariance estimation
#[derive(Debug, Error)]
pub enum CovarianceError {
    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },
}

/// Unbiased sample covariance of the columns of `observations` (T x K).
///
/// Returns a symmetric K x K matrix. Needs at least two rows.
pub fn sample_covariance(observations: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
    let n_obs = observations.nrows();
    if n_obs < 2 {
        return Err(CovarianceError::InsufficientData {
            required: 2,
            actual: n_obs,
        });
    }

    let means = observations
        .mean_axis(Axis(0))
        .ok_or(CovarianceError::InsufficientData {
            required: 2,
            actual: 0,
        })?;
    let centered = observations - &means;
    let mut cov = centered.t().dot(&centered) / (n_obs - 1) as f64;

    // Exact symmetry
    let k = cov.nrows();
    for i in 0..k {
        for j in (i + 1)..k {
            let avg = 0.5 * (cov[[i, j]] + cov[[j, i]]);
            cov[[i, j]] = avg;
            cov[[j, i]] = avg;
        }
    }

    Ok(cov)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_matches_hand_computation() {
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let cov = sample_covariance(&x).unwrap();
        // var(1..4) = 5/3
        assert_abs_diff_eq!(cov[[0, 0]], 5.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cov[[0, 1]], 10.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cov[[1, 1]], 20.0 / 3.0, epsilon = 1e-12);
        assert_eq!(cov[[0, 1]], cov[[1, 0]]);
    }

    #[test]
    fn test_constant_columns_have_zero_covariance() {
        let x = array![[0.5, -1.0], [0.5, -1.0], [0.5, -1.0]];
        let cov = sample_covariance(&x).unwrap();
        assert_abs_diff_eq!(cov, Array2::<f64>::zeros((2, 2)), epsilon = 1e-15);
    }

    #[test]
    fn test_needs_two_rows() {
        let x = array![[1.0, 2.0]];
        assert!(matches!(
            sample_covariance(&x),
            Err(CovarianceError::InsufficientData {
                required: 2,
                actual: 1
            })
        ));
    }
}
