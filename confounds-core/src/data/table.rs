//! Raw confound tables and the caller-supplied source seam.
//!
//! A raw table is a polars `DataFrame` with one row per timepoint. Column
//! presence is never assumed: every accessor here checks before reading.

use polars::prelude::*;

use super::sidecar::SidecarMetadata;
use crate::error::ConfoundError;

/// One scan's confound inputs: the regressor table and its sidecar.
#[derive(Debug, Clone)]
pub struct ScanConfounds {
    pub table: DataFrame,
    pub metadata: SidecarMetadata,
}

impl ScanConfounds {
    pub fn new(table: DataFrame, metadata: SidecarMetadata) -> Self {
        Self { table, metadata }
    }

    /// A scan with no sidecar (enough for every category but compcor).
    pub fn without_metadata(table: DataFrame) -> Self {
        Self::new(table, SidecarMetadata::new())
    }

    pub fn n_scans(&self) -> usize {
        self.table.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.table.column(name).is_ok()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.table
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Read a column as `f64`, mapping nulls to `NaN`.
    pub fn values(&self, name: &str) -> Result<Vec<f64>, ConfoundError> {
        let column = self
            .table
            .column(name)
            .map_err(|_| ConfoundError::missing(name))?;
        let column_err = |e: PolarsError| ConfoundError::ColumnType {
            column: name.to_string(),
            reason: e.to_string(),
        };
        let cast = column
            .as_materialized_series()
            .strict_cast(&DataType::Float64)
            .map_err(column_err)?;
        let values = cast.f64().map_err(column_err)?;
        Ok(values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }
}

impl AsRef<ScanConfounds> for ScanConfounds {
    fn as_ref(&self) -> &ScanConfounds {
        self
    }
}

/// Resolves a caller-defined handle (a path, a database key, a BIDS entity
/// set) into a loaded `ScanConfounds`. The engine never sees the handle.
pub trait ConfoundSource {
    type Handle;
    type Error: std::error::Error + Send + Sync + 'static;

    fn resolve(&self, handle: &Self::Handle) -> Result<ScanConfounds, Self::Error>;
}
