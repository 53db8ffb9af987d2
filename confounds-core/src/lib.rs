//! Confounds Core: selection and assembly of nuisance regressors.
//!
//! Given one scan's fMRIPrep confound table and sidecar metadata, this crate
//! builds the regressor matrix a denoising strategy asks for:
//! - Strategy validation over a closed set of noise categories
//! - Sub-model suffix expansion (derivatives, quadratic terms)
//! - Exact-name and keyword column lookup
//! - CompCor component selection by mask and count
//! - Optional PCA compression of motion parameters
//! - Outlier censoring with optimized short-segment removal
//! - Fixed-order assembly with first-row backfill and demeaning
//!
//! File discovery and parsing live with the caller; see `ConfoundSource`.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod loaders;
pub mod strategy;

pub use config::{
    CensoringMode, CompcorCount, CompcorVariant, ConfoundConfig, MotionReduction, Preset, SubModel,
};
pub use data::{ComponentMeta, ConfoundSource, MaskLabel, ScanConfounds, SidecarMetadata};
pub use engine::{ConfoundMatrix, OneOrMany, StrategyEngine};
pub use error::ConfoundError;
pub use strategy::{NoiseCategory, Strategy};

/// Matrix types behind `ConfoundMatrix::values`.
pub use nalgebra;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn engine_is_send_sync() {
        assert_send::<StrategyEngine>();
        assert_sync::<StrategyEngine>();
    }

    #[test]
    fn scan_inputs_are_send_sync() {
        assert_send::<ScanConfounds>();
        assert_sync::<ScanConfounds>();
    }

    #[test]
    fn outputs_are_send_sync() {
        assert_send::<ConfoundMatrix>();
        assert_sync::<ConfoundMatrix>();
        assert_send::<ConfoundError>();
        assert_sync::<ConfoundError>();
    }
}
