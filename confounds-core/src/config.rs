//! Serializable confound-selection configuration.
//!
//! `ConfoundConfig` is the user-facing surface: it round-trips through TOML
//! and JSON, and carries strategy names as plain strings so that a bad name
//! surfaces as `InvalidStrategy` rather than a parse error. Range checks run
//! once in `validate()`, which `StrategyEngine::new` calls.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfoundError;
use crate::strategy::Strategy;

// ─── Sub-models ──────────────────────────────────────────────────────

/// Which suffix-expanded variants accompany each base confound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubModel {
    #[default]
    Basic,
    Derivatives,
    Power2,
    Full,
}

impl SubModel {
    /// Suffixes appended to each base name, in column order.
    pub fn suffixes(&self) -> &'static [&'static str] {
        match self {
            SubModel::Basic => &[],
            SubModel::Derivatives => &["derivative1"],
            SubModel::Power2 => &["power2"],
            SubModel::Full => &["derivative1", "power2", "derivative1_power2"],
        }
    }
}

/// Outlier censoring flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CensoringMode {
    /// Threshold-based outliers only.
    #[default]
    Basic,
    /// Threshold-based outliers plus absorption of short clean segments.
    Optimized,
}

/// Which compcor family to draw components from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompcorVariant {
    #[default]
    Anat,
    Temp,
    Full,
}

/// How many compcor components to keep per mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "CountRepr", into = "CountRepr")]
pub enum CompcorCount {
    /// Keep every component the pipeline retained ("auto").
    #[default]
    All,
    /// Keep the first `n` components in index order.
    Exactly(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum CountRepr {
    Count(i64),
    Keyword(String),
}

impl TryFrom<CountRepr> for CompcorCount {
    type Error = String;

    fn try_from(repr: CountRepr) -> Result<Self, Self::Error> {
        match repr {
            CountRepr::Keyword(k) if k == "auto" => Ok(CompcorCount::All),
            CountRepr::Keyword(k) => Err(format!("n_compcor must be \"auto\" or an integer, got \"{k}\"")),
            CountRepr::Count(n) if n > 0 => Ok(CompcorCount::Exactly(n as usize)),
            CountRepr::Count(n) => Err(format!("n_compcor must be positive, got {n}")),
        }
    }
}

impl From<CompcorCount> for CountRepr {
    fn from(count: CompcorCount) -> Self {
        match count {
            CompcorCount::All => CountRepr::Keyword("auto".into()),
            CompcorCount::Exactly(n) => CountRepr::Count(n as i64),
        }
    }
}

/// Optional PCA compression of the motion block.
///
/// Serialized as a single number: `0` disables, an integer `>= 1` keeps that
/// many components, a fraction in `(0, 1)` keeps the fewest components whose
/// cumulative explained variance exceeds it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum MotionReduction {
    #[default]
    Disabled,
    Components(usize),
    VarianceExplained(f64),
}

impl TryFrom<f64> for MotionReduction {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("n_motion must be a non-negative number, got {value}"));
        }
        if value == 0.0 {
            Ok(MotionReduction::Disabled)
        } else if value < 1.0 {
            Ok(MotionReduction::VarianceExplained(value))
        } else if value.fract() == 0.0 {
            Ok(MotionReduction::Components(value as usize))
        } else {
            Err(format!("n_motion above 1 must be an integer, got {value}"))
        }
    }
}

impl From<MotionReduction> for f64 {
    fn from(reduction: MotionReduction) -> Self {
        match reduction {
            MotionReduction::Disabled => 0.0,
            MotionReduction::Components(n) => n as f64,
            MotionReduction::VarianceExplained(f) => f,
        }
    }
}

// ─── Config ──────────────────────────────────────────────────────────

/// Complete confound-selection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfoundConfig {
    /// Noise categories to include, by name.
    pub strategy: Vec<String>,
    pub motion: SubModel,
    pub n_motion: MotionReduction,
    pub censoring: CensoringMode,
    /// Framewise displacement threshold (mm).
    pub fd_thresh: f64,
    /// Standardized DVARS threshold.
    pub std_dvars_thresh: f64,
    pub wm_csf: SubModel,
    pub global_signal: SubModel,
    pub compcor: CompcorVariant,
    /// Use components from the combined WM+CSF mask instead of per-mask ones.
    pub acompcor_combined: bool,
    pub n_compcor: CompcorCount,
    /// Remove each column's temporal mean from the output.
    pub demean: bool,
}

impl Default for ConfoundConfig {
    fn default() -> Self {
        Self {
            strategy: vec!["motion".into(), "high_pass".into(), "wm_csf".into()],
            motion: SubModel::Full,
            n_motion: MotionReduction::Disabled,
            censoring: CensoringMode::Basic,
            fd_thresh: 0.2,
            std_dvars_thresh: 3.0,
            wm_csf: SubModel::Basic,
            global_signal: SubModel::Basic,
            compcor: CompcorVariant::Anat,
            acompcor_combined: true,
            n_compcor: CompcorCount::All,
            demean: true,
        }
    }
}

impl ConfoundConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfoundError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfoundError::InvalidConfig(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfoundError> {
        toml::from_str(content).map_err(|e| ConfoundError::InvalidConfig(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ConfoundError> {
        toml::to_string_pretty(self).map_err(|e| ConfoundError::InvalidConfig(e.to_string()))
    }

    /// Replace the strategy, keeping every other field.
    pub fn with_strategy<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategy = names.into_iter().map(Into::into).collect();
        self
    }

    /// Parse the strategy names into a validated `Strategy`.
    pub fn parsed_strategy(&self) -> Result<Strategy, ConfoundError> {
        Strategy::from_names(&self.strategy)
    }

    /// Check every numeric parameter and the strategy names.
    pub fn validate(&self) -> Result<Strategy, ConfoundError> {
        let strategy = self.parsed_strategy()?;

        for (name, value) in [
            ("fd_thresh", self.fd_thresh),
            ("std_dvars_thresh", self.std_dvars_thresh),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfoundError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if self.n_compcor == CompcorCount::Exactly(0) {
            return Err(ConfoundError::InvalidConfig(
                "n_compcor must be positive or \"auto\"".into(),
            ));
        }

        match self.n_motion {
            MotionReduction::Components(0) => {
                return Err(ConfoundError::InvalidConfig(
                    "n_motion = 0 components; use MotionReduction::Disabled to keep raw motion".into(),
                ));
            }
            MotionReduction::VarianceExplained(f) if !(f > 0.0 && f < 1.0) => {
                return Err(ConfoundError::InvalidConfig(format!(
                    "n_motion variance fraction must lie in (0, 1), got {f}"
                )));
            }
            _ => {}
        }

        Ok(strategy)
    }

    /// Deterministic BLAKE3 digest of the canonical JSON form.
    pub fn config_hash(&self) -> String {
        // Infallible: no map keys, and serde_json writes non-finite floats as null.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

// ─── Presets ─────────────────────────────────────────────────────────

/// Named starting points for common denoising pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Minimal,
    Scrubbing,
    Compcor,
    IcaAroma,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Minimal,
        Preset::Scrubbing,
        Preset::Compcor,
        Preset::IcaAroma,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Minimal => "minimal",
            Preset::Scrubbing => "scrubbing",
            Preset::Compcor => "compcor",
            Preset::IcaAroma => "ica_aroma",
        }
    }

    pub fn config(&self) -> ConfoundConfig {
        let base = ConfoundConfig::default();
        match self {
            Preset::Minimal => ConfoundConfig {
                motion: SubModel::Full,
                wm_csf: SubModel::Basic,
                ..base.with_strategy(["motion", "high_pass", "wm_csf"])
            },
            Preset::Scrubbing => ConfoundConfig {
                motion: SubModel::Full,
                wm_csf: SubModel::Full,
                censoring: CensoringMode::Optimized,
                fd_thresh: 0.2,
                std_dvars_thresh: 3.0,
                ..base.with_strategy(["motion", "censoring", "high_pass", "wm_csf"])
            },
            Preset::Compcor => ConfoundConfig {
                motion: SubModel::Full,
                compcor: CompcorVariant::Anat,
                n_compcor: CompcorCount::All,
                acompcor_combined: true,
                ..base.with_strategy(["motion", "high_pass", "compcor"])
            },
            Preset::IcaAroma => ConfoundConfig {
                wm_csf: SubModel::Basic,
                ..base.with_strategy(["high_pass", "wm_csf", "ica_aroma"])
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ConfoundError::InvalidConfig(format!("unknown preset: {s}")))
    }
}
