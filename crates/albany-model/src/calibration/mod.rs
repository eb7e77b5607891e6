//! Factor model calibration
//!
//! Turns historical factor and asset-return tables into the parameters of a
//! factor-driven return model:
//!
//! s_{t+1} = (I - Phi) * s_t + e_t,   e_t ~ (0, Sigma_state)
//! r_t     = alpha + B * s_t + u_t,   u_t ~ (0, Sigma_return)
//!
//! where s_t holds the M factor values and r_t the N asset excess returns.
//! [`FactorCalibrator::calibrate`] loads, aligns, fits and validates in one
//! step; a calibrator value always holds a complete, shape-checked set of
//! parameters.

pub mod config;
pub mod returns;
pub mod var;

pub use config::CalibratorConfig;
pub use returns::{ReturnFit, fit_return_model};
pub use var::{VarFit, fit_var1};

use crate::covariance::CovarianceError;
use crate::regression::{LinearRegression, OrdinaryLeastSquares, RegressionError};
use albany_data::{DataError, TableSource};
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use thiserror::Error;

/// Fewest aligned observations a calibration accepts.
///
/// The VAR loses one row to the lag and needs two residual rows for a
/// sample covariance.
pub const MIN_OBSERVATIONS: usize = 3;

/// Calibration errors
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// Loading or parsing a source table failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Regression failed
    #[error("Regression error: {0}")]
    Regression(#[from] RegressionError),

    /// Covariance estimation failed
    #[error("Covariance error: {0}")]
    Covariance(#[from] CovarianceError),

    /// Too few rows in the requested window
    #[error("Insufficient data: need at least {required} aligned observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// An estimated matrix has the wrong shape
    #[error("Dimension mismatch for {name}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Which quantity is malformed
        name: String,
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        actual: Vec<usize>,
    },

    /// Factor or asset lists are unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Facts about a calibration run that don't change the parameters but are
/// worth surfacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationDiagnostics {
    /// Aligned observations used (T)
    pub observations: usize,
    /// Rows present in only one of the two tables
    pub dropped_rows: usize,
    /// Rank of the lagged factor panel in the VAR regression
    pub var_rank: usize,
    /// Rank of the demeaned factor panel in the return regression
    pub return_rank: usize,
}

impl CalibrationDiagnostics {
    /// Whether either regression fell back to a minimum-norm solution.
    pub const fn is_rank_deficient(&self, factors: usize) -> bool {
        self.var_rank < factors || self.return_rank < factors
    }
}

/// Calibrated VAR(1) factor model.
#[derive(Debug, Clone)]
pub struct FactorCalibrator {
    factors: Vec<String>,
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    alpha: Array1<f64>,
    loadings: Array2<f64>,
    phi: Array2<f64>,
    sigma_state: Array2<f64>,
    sigma_return: Array2<f64>,
    risk_free_rate: f64,
    diagnostics: CalibrationDiagnostics,
}

impl FactorCalibrator {
    /// Calibrate from the CSV tables named in `config` with ordinary least squares.
    pub fn from_config(config: &CalibratorConfig) -> Result<Self, CalibrationError> {
        Self::calibrate(
            config,
            &config.factor_source(),
            &config.return_source(),
            &OrdinaryLeastSquares::new(),
        )
    }

    /// Load, align and fit.
    ///
    /// The factor table must provide every factor plus the risk-free column;
    /// the return table every asset. Both are restricted to the configured
    /// window. `Phi`, `Sigma_state` and the risk-free rate come from the
    /// windowed factor table alone; the return model is fitted on the dates
    /// both tables share.
    ///
    /// # Errors
    /// * [`CalibrationError::InvalidConfig`] for empty or repeated names
    /// * [`CalibrationError::Data`] for unreadable tables or missing columns
    /// * [`CalibrationError::InsufficientData`] when fewer than
    ///   [`MIN_OBSERVATIONS`] dates survive filtering and alignment
    /// * [`CalibrationError::DimensionMismatch`] if the regression returns
    ///   matrices of the wrong shape
    pub fn calibrate<F, R, L>(
        config: &CalibratorConfig,
        factor_source: &F,
        return_source: &R,
        regression: &L,
    ) -> Result<Self, CalibrationError>
    where
        F: TableSource + ?Sized,
        R: TableSource + ?Sized,
        L: LinearRegression + ?Sized,
    {
        config.validate()?;
        let window = config.window()?;

        let factor_table = factor_source.load(&config.factor_columns(), &window)?;
        let return_table = return_source.load(&config.assets, &window)?;

        let aligned = factor_table.align(&return_table);
        let dropped_rows = aligned.dropped();
        if dropped_rows > 0 {
            tracing::warn!(
                factor_only = aligned.dropped_left,
                return_only = aligned.dropped_right,
                "factor and return tables cover different dates; unmatched rows dropped"
            );
        }

        let observations = aligned.left.len();
        if observations < MIN_OBSERVATIONS {
            return Err(CalibrationError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: observations,
            });
        }

        let risk_free_rate = factor_table
            .column(&config.risk_free_column)
            .and_then(|rf| rf.mean())
            .ok_or(CalibrationError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: 0,
            })?;

        // The state process uses every windowed factor row; only the return
        // regression needs dates shared with the return table.
        let factor_states = factor_table.select(&config.factors)?.into_values();
        let var = fit_var1(&factor_states, regression)?;

        let dates = aligned.left.dates().to_vec();
        let states = aligned.left.select(&config.factors)?.into_values();
        let returns = aligned.right.into_values();
        let ret = fit_return_model(&states, &returns, regression)?;

        let calibrator = Self {
            factors: config.factors.clone(),
            assets: config.assets.clone(),
            dates,
            alpha: ret.alpha,
            loadings: ret.loadings,
            phi: var.phi,
            sigma_state: var.sigma_state,
            sigma_return: ret.sigma_return,
            risk_free_rate,
            diagnostics: CalibrationDiagnostics {
                observations,
                dropped_rows,
                var_rank: var.rank,
                return_rank: ret.rank,
            },
        };
        calibrator.validate_shapes()?;

        tracing::info!(
            factors = calibrator.factor_count(),
            assets = calibrator.asset_count(),
            observations,
            "calibrated factor model"
        );
        Ok(calibrator)
    }

    fn validate_shapes(&self) -> Result<(), CalibrationError> {
        let m = self.factor_count();
        let n = self.asset_count();
        let checks: [(&str, Vec<usize>, &[usize]); 5] = [
            ("Phi", vec![m, m], self.phi.shape()),
            ("alpha", vec![n], self.alpha.shape()),
            ("B", vec![n, m], self.loadings.shape()),
            ("Sigma_return", vec![n, n], self.sigma_return.shape()),
            ("Sigma_state", vec![m, m], self.sigma_state.shape()),
        ];
        for (name, expected, actual) in checks {
            if expected != actual {
                return Err(CalibrationError::DimensionMismatch {
                    name: name.to_string(),
                    expected,
                    actual: actual.to_vec(),
                });
            }
        }
        Ok(())
    }

    /// Number of factors (M).
    pub fn factor_count(&self) -> usize {
        self.factors.len()
    }

    /// Number of assets (N).
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Factor names, in state order.
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    /// Asset names, in return order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Dates of the aligned sample.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Return intercepts (N).
    pub const fn alpha(&self) -> &Array1<f64> {
        &self.alpha
    }

    /// Factor loadings B (N x M).
    pub const fn loadings(&self) -> &Array2<f64> {
        &self.loadings
    }

    /// Mean-reversion matrix Phi (M x M).
    pub const fn phi(&self) -> &Array2<f64> {
        &self.phi
    }

    /// VAR residual covariance (M x M).
    pub const fn sigma_state(&self) -> &Array2<f64> {
        &self.sigma_state
    }

    /// Return residual covariance (N x N).
    pub const fn sigma_return(&self) -> &Array2<f64> {
        &self.sigma_return
    }

    /// Mean per-period risk-free rate over the window, in decimals.
    pub const fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Run diagnostics.
    pub const fn diagnostics(&self) -> &CalibrationDiagnostics {
        &self.diagnostics
    }
}
