//! Delimited-text table source.
//!
//! Reads files laid out like the Kenneth French data library exports: a
//! header row, a `YYYYMM` index column, and one percent-scaled column per
//! series. Factor files are comma separated, industry portfolio files are
//! tab separated; both are handled by choosing the delimiter.

use crate::error::{DataError, Result};
use crate::table::{SeriesTable, TableSource};
use crate::window::{DateWindow, parse_month_index};
use csv::{ReaderBuilder, Trim};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scale applied to percent-quoted sources to obtain decimal returns.
pub const PERCENT: f64 = 0.01;

/// Default name of the month index column.
pub const DEFAULT_INDEX_COLUMN: &str = "index";

/// Table source backed by a delimited text file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvTableSource {
    /// File to read
    pub path: PathBuf,
    /// Field delimiter (must be ASCII)
    pub delimiter: char,
    /// Name of the `YYYYMM` column
    pub index_column: String,
    /// Multiplier applied to every loaded value
    pub scale: f64,
}

impl CsvTableSource {
    /// Comma-separated, percent-scaled source with an `index` column.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: ',',
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
            scale: PERCENT,
        }
    }

    /// Set the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the index column name.
    #[must_use]
    pub fn with_index_column(mut self, name: impl Into<String>) -> Self {
        self.index_column = name.into();
        self
    }

    /// Set the value scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    fn table_name(&self) -> String {
        self.path.display().to_string()
    }

    fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter).map_err(|_| DataError::Parse {
            table: self.table_name(),
            line: 0,
            column: String::new(),
            reason: format!("delimiter {:?} is not a single-byte character", self.delimiter),
        })
    }
}

impl TableSource for CsvTableSource {
    fn load(&self, columns: &[String], window: &DateWindow) -> Result<SeriesTable> {
        let table = self.table_name();
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter_byte()?)
            .trim(Trim::All)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataError::MissingColumn {
                    table: table.clone(),
                    column: name.to_string(),
                })
        };
        let index_at = position(&self.index_column)?;
        let value_at: Vec<usize> = columns
            .iter()
            .map(|c| position(c))
            .collect::<Result<_>>()?;

        let mut dates = Vec::new();
        let mut values = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);
            let raw_index = record.get(index_at).unwrap_or_default();
            let date = parse_month_index(raw_index).ok_or_else(|| DataError::Parse {
                table: table.clone(),
                line,
                column: self.index_column.clone(),
                reason: format!("'{raw_index}' is not a YYYYMM month"),
            })?;
            if !window.contains(date) {
                continue;
            }

            for (name, &j) in columns.iter().zip(&value_at) {
                let raw = record.get(j).unwrap_or_default();
                let value: f64 = raw.parse().map_err(|_| DataError::Parse {
                    table: table.clone(),
                    line,
                    column: name.clone(),
                    reason: format!("'{raw}' is not a number"),
                })?;
                values.push(value);
            }
            dates.push(date);
        }

        tracing::debug!(
            table = %table,
            rows = dates.len(),
            columns = columns.len(),
            "loaded table"
        );

        let values = Array2::from_shape_vec((dates.len(), columns.len()), values).map_err(|_| {
            DataError::DimensionMismatch {
                expected: dates.len() * columns.len(),
                actual: 0,
            }
        })?;
        Ok(SeriesTable::new(dates, columns.to_vec(), values)?.scaled(self.scale))
    }
}
