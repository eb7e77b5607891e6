#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/albany/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod calibration;
pub mod covariance;
pub mod linalg;
pub mod regime;
pub mod regression;

// Re-export main types
pub use calibration::{
    CalibrationDiagnostics, CalibrationError, CalibratorConfig, FactorCalibrator, MIN_OBSERVATIONS,
};
pub use regime::{RegimeError, RegimeModel, RegimeModelConfig};
pub use regression::{Intercept, LinearRegression, OrdinaryLeastSquares, RegressionFit};
