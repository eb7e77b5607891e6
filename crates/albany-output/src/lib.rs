#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/albany/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod matrix;
pub mod report;
pub mod summary;

pub use matrix::LabeledMatrix;
pub use report::{OutputFormat, Report, ReportError};
pub use summary::{CalibrationSummary, RegimeSummary};
