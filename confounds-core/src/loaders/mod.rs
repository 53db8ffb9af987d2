//! Category loaders: one per noise category, each producing a `ConfoundBlock`.
//!
//! - `expand`: base names → suffix variants per sub-model
//! - `resolve`: exact-name and keyword column lookup
//! - `compcor`: sidecar-driven component enumeration and truncation
//! - `motion`: optional PCA compression of the motion block
//! - `censoring`: outlier detection and one-hot indicator regressors

pub mod censoring;
pub mod compcor;
pub mod expand;
pub mod motion;
pub mod resolve;

pub use censoring::Censor;
pub use compcor::{compcor_columns, load_compcor};
pub use expand::expand_params;
pub use motion::{load_motion, reduce_motion, MOTION_PARAMS};
pub use resolve::{find_confounds, select_columns, select_keywords};

/// A column subset produced by one loader, column-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfoundBlock {
    labels: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl ConfoundBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, values: Vec<f64>) {
        self.labels.push(label.into());
        self.columns.push(values);
    }

    /// Append every column of `other` after this block's columns.
    pub fn extend(&mut self, other: ConfoundBlock) {
        self.labels.extend(other.labels);
        self.columns.extend(other.columns);
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, label: &str) -> Option<&[f64]> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.columns[i].as_slice())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<f64>>) {
        (self.labels, self.columns)
    }
}
