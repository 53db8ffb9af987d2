//! Error taxonomy for confound selection.
//!
//! Every failure aborts the current table's load. Nothing here is transient:
//! the caller adjusts the strategy or the input and tries again.

use thiserror::Error;

/// Errors raised while validating a configuration or loading a table.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfoundError {
    #[error("{0}")]
    InvalidStrategy(String),

    #[error(
        "The parameter {name} cannot be found in the available confounds. \
         You may want to use a different denoising strategy"
    )]
    MissingParameter { name: String },

    #[error("could not find any confound with the key {keyword}")]
    NoMatchingConfound { keyword: String },

    #[error(
        "User requested n_motion={requested} motion components, but found only {available}."
    )]
    ComponentCountExceeded { requested: usize, available: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("column '{column}' is not numeric: {reason}")]
    ColumnType { column: String, reason: String },

    #[error("confound table has no rows")]
    EmptyTable,
}

impl ConfoundError {
    pub(crate) fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }
}
