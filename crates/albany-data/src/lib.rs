#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/albany/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod delimited;
pub mod error;
pub mod table;
pub mod window;

pub use delimited::{CsvTableSource, DEFAULT_INDEX_COLUMN, PERCENT};
pub use error::{DataError, Result};
pub use table::{AlignedTables, SeriesTable, TableSource};
pub use window::{DateWindow, parse_month_index};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
