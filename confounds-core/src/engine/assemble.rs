//! Final matrix assembly: column concatenation, first-row backfill, demeaning.

use nalgebra::DMatrix;
use polars::prelude::*;

use crate::loaders::ConfoundBlock;

/// Selected confounds for one scan: rows are timepoints, columns regressors.
///
/// `labels` always has one entry per column, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfoundMatrix {
    pub values: DMatrix<f64>,
    pub labels: Vec<String>,
}

impl ConfoundMatrix {
    /// Build from an assembled block, backfilling the first row and
    /// optionally removing each column's mean.
    pub fn assemble(block: ConfoundBlock, n_scans: usize, demean: bool) -> Self {
        let (labels, columns) = block.into_parts();
        let mut values = DMatrix::from_fn(n_scans, columns.len(), |r, c| columns[c][r]);
        backfill_first_row(&mut values);
        if demean {
            demean_columns(&mut values);
        }
        Self { values, labels }
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// Values of one labelled column.
    pub fn column(&self, label: &str) -> Option<Vec<f64>> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|c| self.values.column(c).iter().copied().collect())
    }

    /// Convert back to a polars frame, one column per label.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .labels
            .iter()
            .enumerate()
            .map(|(c, label)| {
                let values: Vec<f64> = self.values.column(c).iter().copied().collect();
                Column::new(label.as_str().into(), values)
            })
            .collect();
        DataFrame::new(columns)
    }
}

/// Replace a missing first-row value with the second row's value.
///
/// Derivative regressors have no defined first sample.
pub fn backfill_first_row(values: &mut DMatrix<f64>) {
    if values.nrows() < 2 {
        return;
    }
    for c in 0..values.ncols() {
        if values[(0, c)].is_nan() {
            values[(0, c)] = values[(1, c)];
        }
    }
}

/// Subtract each column's arithmetic mean.
///
/// The mean is taken over finite cells only; `NaN` cells stay `NaN`.
pub fn demean_columns(values: &mut DMatrix<f64>) {
    for mut column in values.column_iter_mut() {
        let (sum, count) = column
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            continue;
        }
        let mean = sum / count as f64;
        for v in column.iter_mut().filter(|v| v.is_finite()) {
            *v -= mean;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> ConfoundBlock {
        let mut b = ConfoundBlock::new();
        b.push("trans_x", vec![1.0, 2.0, 3.0]);
        b.push("trans_x_derivative1", vec![f64::NAN, 1.0, 1.0]);
        b
    }

    #[test]
    fn assemble_keeps_label_and_column_order() {
        let m = ConfoundMatrix::assemble(block(), 3, false);
        assert_eq!(m.labels, vec!["trans_x", "trans_x_derivative1"]);
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.column("trans_x"), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn first_row_nan_is_backfilled() {
        let m = ConfoundMatrix::assemble(block(), 3, false);
        assert_eq!(m.column("trans_x_derivative1"), Some(vec![1.0, 1.0, 1.0]));
    }

    #[test]
    fn demeaned_columns_have_zero_mean() {
        let m = ConfoundMatrix::assemble(block(), 3, true);
        for c in 0..m.n_cols() {
            assert!(m.values.column(c).sum().abs() < 1e-12);
        }
        assert_eq!(m.column("trans_x"), Some(vec![-1.0, 0.0, 1.0]));
    }

    #[test]
    fn demeaning_skips_interior_nan() {
        let mut values = DMatrix::from_column_slice(5, 1, &[1.0, 2.0, f64::NAN, 4.0, 5.0]);
        demean_columns(&mut values);
        let column: Vec<f64> = values.column(0).iter().copied().collect();
        assert_eq!(column[0], -2.0);
        assert_eq!(column[1], -1.0);
        assert!(column[2].is_nan());
        assert_eq!(column[3], 1.0);
        assert_eq!(column[4], 2.0);
    }

    #[test]
    fn all_nan_column_is_unchanged() {
        let mut values = DMatrix::from_element(3, 1, f64::NAN);
        demean_columns(&mut values);
        assert!(values.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn single_row_table_is_left_alone() {
        let mut b = ConfoundBlock::new();
        b.push("x_derivative1", vec![f64::NAN]);
        let m = ConfoundMatrix::assemble(b, 1, false);
        assert!(m.values[(0, 0)].is_nan());
    }

    #[test]
    fn dataframe_conversion_preserves_labels() {
        let df = ConfoundMatrix::assemble(block(), 3, false).to_dataframe().unwrap();
        assert_eq!(df.width(), 2);
        assert_eq!(df.height(), 3);
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["trans_x", "trans_x_derivative1"]);
    }
}
