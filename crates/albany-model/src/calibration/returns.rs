//! Static regression of asset excess returns on the factor state.
//!
//! r_t = alpha + B * s_t + u_t

use super::CalibrationError;
use crate::covariance::sample_covariance;
use crate::regression::{Intercept, LinearRegression};
use ndarray::{Array1, Array2};

/// Fitted return-on-factor model.
#[derive(Debug, Clone)]
pub struct ReturnFit {
    /// Intercepts (N)
    pub alpha: Array1<f64>,
    /// Factor loadings B (N x M), row i = exposures of asset i
    pub loadings: Array2<f64>,
    /// Residual covariance (N x N)
    pub sigma_return: Array2<f64>,
    /// Residuals, T x N
    pub residuals: Array2<f64>,
    /// Numerical rank of the demeaned factors
    pub rank: usize,
}

/// Regress a T x N return panel on a T x M factor panel with intercepts.
///
/// # Errors
/// Fails if the panels have different row counts, if there are fewer than
/// two rows (no residual covariance), or with the regression's error.
pub fn fit_return_model<L>(
    states: &Array2<f64>,
    returns: &Array2<f64>,
    regression: &L,
) -> Result<ReturnFit, CalibrationError>
where
    L: LinearRegression + ?Sized,
{
    if states.nrows() != returns.nrows() {
        return Err(CalibrationError::DimensionMismatch {
            name: "return rows".to_string(),
            expected: vec![states.nrows()],
            actual: vec![returns.nrows()],
        });
    }

    let fit = regression.fit(states, returns, Intercept::Included)?;
    let sigma_return = sample_covariance(&fit.residuals)?;
    tracing::debug!(
        assets = returns.ncols(),
        factors = states.ncols(),
        observations = states.nrows(),
        "fitted return model"
    );

    Ok(ReturnFit {
        alpha: fit.intercept,
        loadings: fit.coefficients,
        sigma_return,
        residuals: fit.residuals,
        rank: fit.rank,
    })
}
