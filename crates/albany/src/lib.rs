#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/albany/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use albany_data as data;
pub use albany_model as model;
pub use albany_output as output;

pub use albany_model::{CalibratorConfig, FactorCalibrator, RegimeModel, RegimeModelConfig};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
