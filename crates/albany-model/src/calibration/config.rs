//! Calibrator configuration.

use super::CalibrationError;
use albany_data::{CsvTableSource, DEFAULT_INDEX_COLUMN, DataError, DateWindow, PERCENT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Default factor set: Fama-French five factors plus momentum.
pub const DEFAULT_FACTORS: [&str; 6] = ["Mkt-RF", "SMB", "HML", "RMW", "CMA", "Mom"];

/// Default assets: the ten industry portfolios.
pub const DEFAULT_ASSETS: [&str; 10] = [
    "NoDur", "Durbl", "Manuf", "Enrgy", "HiTec", "Telcm", "Shops", "Hlth", "Utils", "Other",
];

/// Default name of the risk-free column in the factor table.
pub const DEFAULT_RISK_FREE_COLUMN: &str = "RF";

/// What to calibrate and where the data lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibratorConfig {
    /// Ordered factor names (M); also the VAR state
    pub factors: Vec<String>,
    /// Ordered asset names (N)
    pub assets: Vec<String>,
    /// First date of the sample (inclusive)
    pub begin_date: NaiveDate,
    /// Last date of the sample (inclusive)
    pub end_date: NaiveDate,
    /// Factor table location
    pub factor_path: PathBuf,
    /// Factor table delimiter
    pub factor_delimiter: char,
    /// Return table location
    pub return_path: PathBuf,
    /// Return table delimiter
    pub return_delimiter: char,
    /// Name of the `YYYYMM` column in both tables
    pub index_column: String,
    /// Name of the risk-free column in the factor table
    pub risk_free_column: String,
    /// Multiplier turning stored values into decimals
    pub scale: f64,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            factors: DEFAULT_FACTORS.iter().map(|s| s.to_string()).collect(),
            assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
            begin_date: NaiveDate::from_ymd_opt(1964, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap_or_default(),
            factor_path: PathBuf::from("./data/six_factors.csv"),
            factor_delimiter: ',',
            return_path: PathBuf::from("./data/returns.csv"),
            return_delimiter: '\t',
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
            risk_free_column: DEFAULT_RISK_FREE_COLUMN.to_string(),
            scale: PERCENT,
        }
    }
}

impl CalibratorConfig {
    /// Number of factors (M).
    pub fn factor_count(&self) -> usize {
        self.factors.len()
    }

    /// Number of assets (N).
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// The inclusive sample window.
    pub fn window(&self) -> Result<DateWindow, DataError> {
        DateWindow::new(self.begin_date, self.end_date)
    }

    /// Source for the factor table.
    pub fn factor_source(&self) -> CsvTableSource {
        CsvTableSource::new(&self.factor_path)
            .with_delimiter(self.factor_delimiter)
            .with_index_column(&self.index_column)
            .with_scale(self.scale)
    }

    /// Source for the return table.
    pub fn return_source(&self) -> CsvTableSource {
        CsvTableSource::new(&self.return_path)
            .with_delimiter(self.return_delimiter)
            .with_index_column(&self.index_column)
            .with_scale(self.scale)
    }

    /// Columns requested from the factor table: the factors, then the
    /// risk-free column unless it is already one of them.
    pub fn factor_columns(&self) -> Vec<String> {
        let mut columns = self.factors.clone();
        if !columns.contains(&self.risk_free_column) {
            columns.push(self.risk_free_column.clone());
        }
        columns
    }

    /// Check the name lists.
    ///
    /// # Errors
    /// Fails if either list is empty or repeats a name.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        check_names("factor", &self.factors)?;
        check_names("asset", &self.assets)?;
        Ok(())
    }
}

fn check_names(kind: &str, names: &[String]) -> Result<(), CalibrationError> {
    if names.is_empty() {
        return Err(CalibrationError::InvalidConfig(format!(
            "at least one {kind} is required"
        )));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
        return Err(CalibrationError::InvalidConfig(format!(
            "{kind} '{dup}' is listed twice"
        )));
    }
    Ok(())
}
