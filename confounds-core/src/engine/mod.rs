//! Strategy engine: validated configuration plus the category dispatch table.
//!
//! `LOADERS` pairs every `NoiseCategory` with its loader in assembly order.
//! A load walks the table once, runs the loaders whose category is in the
//! strategy, and concatenates their blocks column-wise. Each load is a pure
//! function of (scan, configuration); the engine holds no per-load state.

pub mod assemble;
pub mod batch;

pub use assemble::{backfill_first_row, demean_columns, ConfoundMatrix};
pub use batch::OneOrMany;

use tracing::{debug, info};

use crate::config::ConfoundConfig;
use crate::data::ScanConfounds;
use crate::error::ConfoundError;
use crate::loaders::{self, Censor, ConfoundBlock};
use crate::strategy::{NoiseCategory, Strategy};

type Loader = fn(&StrategyEngine, &ScanConfounds) -> Result<ConfoundBlock, ConfoundError>;

/// Category → loader, in assembly order.
const LOADERS: [(NoiseCategory, Loader); 7] = [
    (NoiseCategory::Motion, StrategyEngine::load_motion),
    (NoiseCategory::Censoring, StrategyEngine::load_censoring),
    (NoiseCategory::HighPass, StrategyEngine::load_high_pass),
    (NoiseCategory::WmCsf, StrategyEngine::load_wm_csf),
    (NoiseCategory::Global, StrategyEngine::load_global),
    (NoiseCategory::Compcor, StrategyEngine::load_compcor),
    (NoiseCategory::IcaAroma, StrategyEngine::load_ica_aroma),
];

/// Selects and assembles confounds for one or many scans.
#[derive(Debug, Clone)]
pub struct StrategyEngine {
    config: ConfoundConfig,
    strategy: Strategy,
    parallel: bool,
}

impl StrategyEngine {
    /// Validate a configuration once; loads never re-validate.
    pub fn new(config: ConfoundConfig) -> Result<Self, ConfoundError> {
        let strategy = config.validate()?;
        Ok(Self {
            config,
            strategy,
            parallel: true,
        })
    }

    /// Enables or disables parallel execution of multi-scan batches.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &ConfoundConfig {
        &self.config
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// The fixed order in which category blocks are concatenated.
    pub fn assembly_order() -> [NoiseCategory; 7] {
        LOADERS.map(|(category, _)| category)
    }

    /// Load a single scan's confound matrix.
    pub fn load(&self, scan: &ScanConfounds) -> Result<ConfoundMatrix, ConfoundError> {
        let n_scans = scan.n_scans();
        if n_scans == 0 {
            return Err(ConfoundError::EmptyTable);
        }

        let mut assembled = ConfoundBlock::new();
        for (category, loader) in LOADERS {
            if !self.strategy.contains(category) {
                continue;
            }
            let block = loader(self, scan)?;
            debug!(%category, columns = block.width(), "loaded category");
            assembled.extend(block);
        }

        let matrix = ConfoundMatrix::assemble(assembled, n_scans, self.config.demean);
        info!(
            rows = matrix.n_rows(),
            columns = matrix.n_cols(),
            "assembled confounds"
        );
        Ok(matrix)
    }

    // ─── Category loaders ────────────────────────────────────────────

    fn load_motion(&self, scan: &ScanConfounds) -> Result<ConfoundBlock, ConfoundError> {
        loaders::load_motion(scan, self.config.motion, self.config.n_motion)
    }

    fn load_censoring(&self, scan: &ScanConfounds) -> Result<ConfoundBlock, ConfoundError> {
        Censor::new(
            self.config.censoring,
            self.config.fd_thresh,
            self.config.std_dvars_thresh,
        )
        .regressors(scan)
    }

    fn load_high_pass(&self, scan: &ScanConfounds) -> Result<ConfoundBlock, ConfoundError> {
        loaders::select_keywords(scan, &["cosine"])
    }

    fn load_wm_csf(&self, scan: &ScanConfounds) -> Result<ConfoundBlock, ConfoundError> {
        let params = loaders::expand_params(&["csf", "white_matter"], self.config.wm_csf);
        loaders::select_columns(scan, &params)
    }

    fn load_global(&self, scan: &ScanConfounds) -> Result<ConfoundBlock, ConfoundError> {
        let params = loaders::expand_params(&["global_signal"], self.config.global_signal);
        loaders::select_columns(scan, &params)
    }

    fn load_compcor(&self, scan: &ScanConfounds) -> Result<ConfoundBlock, ConfoundError> {
        loaders::load_compcor(
            scan,
            self.config.compcor,
            self.config.acompcor_combined,
            self.config.n_compcor,
        )
    }

    fn load_ica_aroma(&self, scan: &ScanConfounds) -> Result<ConfoundBlock, ConfoundError> {
        loaders::select_keywords(scan, &["aroma"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubModel;
    use polars::prelude::*;

    fn scan() -> ScanConfounds {
        ScanConfounds::without_metadata(
            df!(
                "global_signal" => &[10.0, 11.0, 12.0],
                "global_signal_derivative1" => &[None, Some(1.0), Some(1.0)],
                "csf" => &[1.0, 2.0, 3.0],
                "white_matter" => &[4.0, 5.0, 6.0],
                "cosine00" => &[0.5, 0.0, -0.5],
            )
            .unwrap(),
        )
    }

    #[test]
    fn dispatch_table_matches_category_order() {
        assert_eq!(StrategyEngine::assembly_order(), NoiseCategory::ALL);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = ConfoundConfig::default().with_strategy(["motion", "smoothing"]);
        assert!(matches!(
            StrategyEngine::new(config),
            Err(ConfoundError::InvalidStrategy(_))
        ));
    }

    #[test]
    fn blocks_follow_fixed_order_regardless_of_strategy_order() {
        let config = ConfoundConfig {
            global_signal: SubModel::Derivatives,
            demean: false,
            ..ConfoundConfig::default().with_strategy(["global", "wm_csf", "high_pass"])
        };
        let m = StrategyEngine::new(config).unwrap().load(&scan()).unwrap();
        assert_eq!(
            m.labels,
            vec![
                "cosine00",
                "csf",
                "white_matter",
                "global_signal",
                "global_signal_derivative1"
            ]
        );
        assert_eq!(m.column("global_signal_derivative1"), Some(vec![1.0, 1.0, 1.0]));
    }

    #[test]
    fn missing_category_column_aborts_load() {
        let config = ConfoundConfig::default().with_strategy(["wm_csf", "ica_aroma"]);
        let err = StrategyEngine::new(config).unwrap().load(&scan()).unwrap_err();
        assert_eq!(
            err,
            ConfoundError::NoMatchingConfound {
                keyword: "aroma".into()
            }
        );
    }

    #[test]
    fn empty_table_is_rejected() {
        let engine = StrategyEngine::new(ConfoundConfig::default().with_strategy(["wm_csf"])).unwrap();
        let empty = ScanConfounds::without_metadata(
            df!("csf" => Vec::<f64>::new(), "white_matter" => Vec::<f64>::new()).unwrap(),
        );
        assert_eq!(engine.load(&empty).unwrap_err(), ConfoundError::EmptyTable);
    }
}
