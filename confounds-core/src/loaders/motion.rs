//! Motion regressors and their optional PCA compression.
//!
//! The reduction fits on complete rows only (rows with any `NaN` are left
//! out), standardizes each column to zero mean and unit population variance,
//! then projects onto the leading eigenvectors of the correlation matrix.
//! Rows excluded from the fit come back as `NaN` so the block keeps one row
//! per timepoint. Component signs are fixed so that each loading vector's
//! largest-magnitude entry is positive.

use std::cmp::Ordering;

use nalgebra::{DMatrix, SymmetricEigen};
use tracing::debug;

use super::expand::expand_params;
use super::resolve::select_columns;
use super::ConfoundBlock;
use crate::config::{MotionReduction, SubModel};
use crate::data::ScanConfounds;
use crate::error::ConfoundError;

/// The six rigid-body motion parameters.
pub const MOTION_PARAMS: [&str; 6] = ["trans_x", "trans_y", "trans_z", "rot_x", "rot_y", "rot_z"];

/// Load the motion block for a sub-model, then apply the reduction.
pub fn load_motion(
    scan: &ScanConfounds,
    model: SubModel,
    reduction: MotionReduction,
) -> Result<ConfoundBlock, ConfoundError> {
    let params = expand_params(&MOTION_PARAMS, model);
    let block = select_columns(scan, &params)?;
    reduce_motion(block, reduction)
}

/// Compress a motion block with PCA. `Disabled` and `Components(0)` return
/// the block unchanged.
pub fn reduce_motion(
    block: ConfoundBlock,
    reduction: MotionReduction,
) -> Result<ConfoundBlock, ConfoundError> {
    let available = block.width();
    let requested = match reduction {
        MotionReduction::Disabled | MotionReduction::Components(0) => return Ok(block),
        MotionReduction::Components(requested) if requested > available => {
            return Err(ConfoundError::ComponentCountExceeded {
                requested,
                available,
            });
        }
        MotionReduction::Components(requested) => Some(requested),
        MotionReduction::VarianceExplained(_) => None,
    };
    if available == 0 {
        return Ok(block);
    }

    let (_, columns) = block.into_parts();
    let n_rows = columns.first().map_or(0, Vec::len);
    let complete: Vec<usize> = (0..n_rows)
        .filter(|&r| columns.iter().all(|c| !c[r].is_nan()))
        .collect();

    let standardized = standardize(&columns, &complete);
    let pca = Pca::fit(&standardized);

    let n_components = match (requested, reduction) {
        (Some(n), _) => n,
        (None, MotionReduction::VarianceExplained(fraction)) => pca.components_for_variance(fraction),
        (None, _) => available,
    };
    debug!(
        available,
        n_components,
        fitted_rows = complete.len(),
        "motion PCA"
    );

    let scores = &standardized * pca.loadings.columns(0, n_components);
    let mut reduced = ConfoundBlock::new();
    for k in 0..n_components {
        let mut values = vec![f64::NAN; n_rows];
        for (i, &row) in complete.iter().enumerate() {
            values[row] = scores[(i, k)];
        }
        reduced.push(format!("motion_pca_{}", k + 1), values);
    }
    Ok(reduced)
}

/// Z-score the selected rows of each column (population std; a constant
/// column is centred but not scaled).
fn standardize(columns: &[Vec<f64>], rows: &[usize]) -> DMatrix<f64> {
    let m = rows.len();
    let mut z = DMatrix::zeros(m, columns.len());
    if m == 0 {
        return z;
    }
    for (j, column) in columns.iter().enumerate() {
        let mean = rows.iter().map(|&r| column[r]).sum::<f64>() / m as f64;
        let var = rows.iter().map(|&r| (column[r] - mean).powi(2)).sum::<f64>() / m as f64;
        let std = if var > 0.0 { var.sqrt() } else { 1.0 };
        for (i, &r) in rows.iter().enumerate() {
            z[(i, j)] = (column[r] - mean) / std;
        }
    }
    z
}

/// Eigen-decomposition of the standardized data's covariance.
struct Pca {
    /// Eigenvectors as columns, ordered by descending eigenvalue.
    loadings: DMatrix<f64>,
    /// Matching eigenvalues (explained variance), descending.
    explained: Vec<f64>,
}

impl Pca {
    fn fit(z: &DMatrix<f64>) -> Self {
        let p = z.ncols();
        let denom = z.nrows().saturating_sub(1).max(1) as f64;
        let covariance = (z.transpose() * z) / denom;
        let eigen = SymmetricEigen::new(covariance);

        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(Ordering::Equal)
        });

        let mut loadings = DMatrix::zeros(p, p);
        let mut explained = Vec::with_capacity(p);
        for (rank, &idx) in order.iter().enumerate() {
            let mut vector = eigen.eigenvectors.column(idx).clone_owned();
            let pivot = vector
                .iter()
                .copied()
                .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal))
                .unwrap_or(0.0);
            if pivot < 0.0 {
                vector = -vector;
            }
            loadings.set_column(rank, &vector);
            explained.push(eigen.eigenvalues[idx].max(0.0));
        }

        Self {
            loadings,
            explained,
        }
    }

    /// Fewest leading components whose cumulative variance ratio exceeds
    /// `fraction`.
    fn components_for_variance(&self, fraction: f64) -> usize {
        let total: f64 = self.explained.iter().sum();
        if total <= 0.0 {
            return self.explained.len().min(1);
        }
        let mut cumulative = 0.0;
        for (k, value) in self.explained.iter().enumerate() {
            cumulative += value / total;
            if cumulative > fraction {
                return k + 1;
            }
        }
        self.explained.len()
    }
}
