//! Multivariate ordinary least squares.
//!
//! A [`LinearRegression`] fits every column of a response panel `Y` (T x K)
//! on the same regressors `X` (T x P), optionally with a per-output
//! intercept:
//!
//! Y = 1 * intercept^T + X * coefficients^T + E
//!
//! `coefficients` is K x P (one row per output), matching the layout of
//! factor loadings and VAR transition matrices.

use crate::linalg::{LinalgError, least_squares};
use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

/// Regression errors
#[derive(Debug, Error)]
pub enum RegressionError {
    /// No observations to fit
    #[error("Cannot fit a regression on zero observations")]
    EmptyData,

    /// Regressor and response panels disagree
    #[error("Dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
        /// What was being compared
        context: String,
    },

    /// Linear algebra failure
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
}

/// Whether a regression estimates an intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intercept {
    /// Regress through the origin
    Excluded,
    /// Estimate a constant term per output
    Included,
}

/// Fitted multivariate regression.
#[derive(Debug, Clone)]
pub struct RegressionFit {
    /// Slopes, K x P
    pub coefficients: Array2<f64>,
    /// Constant terms, length K (zeros when the intercept is excluded)
    pub intercept: Array1<f64>,
    /// In-sample residuals, T x K
    pub residuals: Array2<f64>,
    /// Numerical rank of the (centred, if an intercept is fitted) regressors
    pub rank: usize,
}

/// Solver for multivariate linear regressions.
pub trait LinearRegression {
    /// Fit `y` (T x K) on `x` (T x P).
    fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array2<f64>,
        intercept: Intercept,
    ) -> Result<RegressionFit, RegressionError>;
}

/// Least squares solved by a singular value decomposition of the design.
///
/// A rank-deficient design yields the minimum-norm coefficient vector
/// instead of failing. With an intercept the slopes are fitted on demeaned
/// data and the intercept recovered from the means, so it is never shrunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinaryLeastSquares;

impl OrdinaryLeastSquares {
    /// Create a solver.
    pub const fn new() -> Self {
        Self
    }
}

impl LinearRegression for OrdinaryLeastSquares {
    fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array2<f64>,
        intercept: Intercept,
    ) -> Result<RegressionFit, RegressionError> {
        let (n_obs, n_features) = x.dim();
        let n_targets = y.ncols();

        if y.nrows() != n_obs {
            return Err(RegressionError::DimensionMismatch {
                expected: n_obs,
                actual: y.nrows(),
                context: "response rows".to_string(),
            });
        }
        if n_obs == 0 {
            return Err(RegressionError::EmptyData);
        }

        let (x_mean, y_mean) = match intercept {
            Intercept::Included => (
                x.mean_axis(Axis(0)).ok_or(RegressionError::EmptyData)?,
                y.mean_axis(Axis(0)).ok_or(RegressionError::EmptyData)?,
            ),
            Intercept::Excluded => (Array1::zeros(n_features), Array1::zeros(n_targets)),
        };
        let x_c = x - &x_mean;
        let y_c = y - &y_mean;

        let solved = least_squares(&x_c, &y_c)?;
        let beta = solved.solution;

        if solved.rank < n_features {
            tracing::warn!(
                rank = solved.rank,
                features = n_features,
                observations = n_obs,
                "regressors are rank deficient, using the minimum-norm solution"
            );
        }

        let coefficients = beta.t().to_owned();
        let intercept = match intercept {
            Intercept::Included => &y_mean - &coefficients.dot(&x_mean),
            Intercept::Excluded => Array1::zeros(n_targets),
        };
        let residuals = y - &(x.dot(&beta) + &intercept);

        Ok(RegressionFit {
            coefficients,
            intercept,
            residuals,
            rank: solved.rank,
        })
    }
}
