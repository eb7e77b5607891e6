//! Date-indexed numeric tables and the [`TableSource`] abstraction.

use crate::error::{DataError, Result};
use crate::window::DateWindow;
use chrono::NaiveDate;
use ndarray::{Array2, ArrayView1, Axis};
use std::collections::HashMap;

/// Label used in errors raised by in-memory tables.
const IN_MEMORY: &str = "in-memory table";

/// Anything that can serve "rows of these named columns inside this date window".
pub trait TableSource {
    /// Load `columns`, in the given order, for every row whose date lies in `window`.
    ///
    /// Rows keep the source's date order. Values are returned in model units,
    /// i.e. after any scaling the source applies.
    fn load(&self, columns: &[String], window: &DateWindow) -> Result<SeriesTable>;
}

/// A T x K table of observations with one date per row and one name per column.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl SeriesTable {
    /// Create a table, checking that `values` is `dates.len() x columns.len()`.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if values.nrows() != dates.len() {
            return Err(DataError::DimensionMismatch {
                expected: dates.len(),
                actual: values.nrows(),
            });
        }
        if values.ncols() != columns.len() {
            return Err(DataError::DimensionMismatch {
                expected: columns.len(),
                actual: values.ncols(),
            });
        }
        Ok(Self {
            dates,
            columns,
            values,
        })
    }

    /// Row dates, in order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The T x K value matrix.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Consume the table and return its value matrix.
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// View of a single column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|j| self.values.column(j))
    }

    /// New table holding only `columns`, in that order.
    pub fn select(&self, columns: &[String]) -> Result<Self> {
        let index = self.column_indices(columns, IN_MEMORY)?;
        let values = self.values.select(Axis(1), &index);
        Ok(Self {
            dates: self.dates.clone(),
            columns: columns.to_vec(),
            values,
        })
    }

    /// New table holding only the rows whose date lies in `window`.
    pub fn filter(&self, window: &DateWindow) -> Self {
        let rows: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| window.contains(**d))
            .map(|(i, _)| i)
            .collect();
        self.take_rows(&rows)
    }

    /// Inner-join two tables on date.
    ///
    /// Only dates present in both tables survive; rows keep `self`'s date
    /// order. Duplicated dates in `other` match their first occurrence.
    pub fn align(&self, other: &Self) -> AlignedTables {
        let mut other_rows: HashMap<NaiveDate, usize> = HashMap::with_capacity(other.len());
        for (i, d) in other.dates.iter().enumerate() {
            other_rows.entry(*d).or_insert(i);
        }

        let mut left = Vec::with_capacity(self.len());
        let mut right = Vec::with_capacity(self.len());
        for (i, d) in self.dates.iter().enumerate() {
            if let Some(&j) = other_rows.get(d) {
                left.push(i);
                right.push(j);
            }
        }

        AlignedTables {
            dropped_left: self.len() - left.len(),
            dropped_right: other.len() - right.len(),
            left: self.take_rows(&left),
            right: other.take_rows(&right),
        }
    }

    /// Multiply every value by `factor`.
    pub fn scaled(mut self, factor: f64) -> Self {
        self.values.mapv_inplace(|v| v * factor);
        self
    }

    pub(crate) fn column_indices(&self, columns: &[String], table: &str) -> Result<Vec<usize>> {
        columns
            .iter()
            .map(|name| {
                self.columns
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| DataError::MissingColumn {
                        table: table.to_string(),
                        column: name.clone(),
                    })
            })
            .collect()
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), rows),
        }
    }
}

impl TableSource for SeriesTable {
    fn load(&self, columns: &[String], window: &DateWindow) -> Result<SeriesTable> {
        self.filter(window).select(columns)
    }
}

/// Result of [`SeriesTable::align`].
#[derive(Debug, Clone)]
pub struct AlignedTables {
    /// Rows of the left table whose date also appears on the right
    pub left: SeriesTable,
    /// Matching rows of the right table, in the same order
    pub right: SeriesTable,
    /// Left rows with no partner
    pub dropped_left: usize,
    /// Right rows with no partner
    pub dropped_right: usize,
}

impl AlignedTables {
    /// Total number of rows discarded by the join.
    pub const fn dropped(&self) -> usize {
        self.dropped_left + self.dropped_right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    fn sample() -> SeriesTable {
        SeriesTable::new(
            vec![month(2020, 1), month(2020, 2), month(2020, 3)],
            names(&["a", "b", "c"]),
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_shape() {
        let result = SeriesTable::new(vec![month(2020, 1)], names(&["a"]), array![[1.0, 2.0]]);
        assert!(matches!(
            result,
            Err(DataError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_select_reorders_columns() {
        let table = sample().select(&names(&["c", "a"])).unwrap();
        assert_eq!(table.columns(), &names(&["c", "a"])[..]);
        assert_eq!(table.values(), &array![[3.0, 1.0], [6.0, 4.0], [9.0, 7.0]]);
    }

    #[test]
    fn test_select_missing_column() {
        let err = sample().select(&names(&["a", "zz"])).unwrap_err();
        match err {
            DataError::MissingColumn { column, .. } => assert_eq!(column, "zz"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_filters_window() {
        let window = DateWindow::new(month(2020, 2), month(2020, 3)).unwrap();
        let table = sample().load(&names(&["b"]), &window).unwrap();
        assert_eq!(table.dates(), &[month(2020, 2), month(2020, 3)]);
        assert_eq!(table.values(), &array![[5.0], [8.0]]);
    }

    #[test]
    fn test_load_empty_window_still_checks_columns() {
        let window = DateWindow::new(month(1990, 1), month(1990, 12)).unwrap();
        assert!(sample().load(&names(&["b"]), &window).unwrap().is_empty());
        assert!(sample().load(&names(&["nope"]), &window).is_err());
    }

    #[test]
    fn test_align_inner_join() {
        let other = SeriesTable::new(
            vec![month(2020, 3), month(2020, 1), month(2020, 4)],
            names(&["x"]),
            array![[30.0], [10.0], [40.0]],
        )
        .unwrap();

        let aligned = sample().align(&other);
        assert_eq!(aligned.left.dates(), &[month(2020, 1), month(2020, 3)]);
        assert_eq!(aligned.right.dates(), &[month(2020, 1), month(2020, 3)]);
        assert_eq!(aligned.right.values(), &array![[10.0], [30.0]]);
        assert_eq!(aligned.dropped_left, 1);
        assert_eq!(aligned.dropped_right, 1);
        assert_eq!(aligned.dropped(), 2);
    }

    #[test]
    fn test_scaled() {
        let table = sample().scaled(0.01);
        assert_eq!(table.values()[[0, 0]], 0.01);
    }
}
