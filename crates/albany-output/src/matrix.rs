//! Labelled matrices for display and serialisation.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A matrix with named rows and columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabeledMatrix {
    /// One label per row.
    pub rows: Vec<String>,

    /// One label per column.
    pub columns: Vec<String>,

    /// Row-major values.
    pub values: Vec<Vec<f64>>,
}

impl LabeledMatrix {
    /// Label an `ndarray` matrix.
    pub fn from_array(rows: Vec<String>, columns: Vec<String>, values: &Array2<f64>) -> Self {
        Self {
            rows,
            columns,
            values: values.rows().into_iter().map(|r| r.to_vec()).collect(),
        }
    }

    /// Label a vector as a single-column matrix.
    pub fn from_column(rows: Vec<String>, column: &str, values: &Array1<f64>) -> Self {
        Self {
            rows,
            columns: vec![column.to_string()],
            values: values.iter().map(|&v| vec![v]).collect(),
        }
    }

    /// Render as a fixed-width table under `title`.
    pub fn to_ascii_table(&self, title: &str) -> String {
        let label_width = self
            .rows
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(8);
        let cell_width = self
            .columns
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(12);

        let mut output = format!("{title}\n");
        output.push_str(&" ".repeat(label_width));
        for column in &self.columns {
            output.push_str(&format!(" {column:>cell_width$}"));
        }
        output.push('\n');

        for (label, row) in self.rows.iter().zip(&self.values) {
            output.push_str(&format!("{label:<label_width$}"));
            for value in row {
                output.push_str(&format!(" {value:>cell_width$.6}"));
            }
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_array() {
        let m = LabeledMatrix::from_array(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            &array![[1.0, 2.0], [3.0, 4.0]],
        );
        assert_eq!(m.values, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_ascii_table_layout() {
        let m = LabeledMatrix::from_column(vec!["NoDur".into()], "alpha", &array![0.00125]);
        let table = m.to_ascii_table("Alpha");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Alpha");
        assert!(lines[1].ends_with("alpha"));
        assert!(lines[2].starts_with("NoDur"));
        assert!(lines[2].ends_with("0.001250"));
    }
}
