//! Inclusive date windows and `YYYYMM` index parsing.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive `[begin, end]` date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    begin: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting `begin > end`.
    pub fn new(begin: NaiveDate, end: NaiveDate) -> Result<Self> {
        if begin > end {
            return Err(DataError::InvalidDateRange { start: begin, end });
        }
        Ok(Self { begin, end })
    }

    /// First date of the window.
    pub const fn begin(&self) -> NaiveDate {
        self.begin
    }

    /// Last date of the window.
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the window (both bounds included).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.begin <= date && date <= self.end
    }
}

/// Parse a `YYYYMM` month index into the first day of that month.
///
/// Surrounding whitespace is ignored. Returns `None` for anything that is
/// not six digits naming a valid month.
pub fn parse_month_index(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = raw[..4].parse().ok()?;
    let month: u32 = raw[4..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}
