//! Denoising strategy: a validated set of noise categories.
//!
//! `NoiseCategory` is declared in assembly order, so the derived `Ord`
//! and `BTreeSet` iteration both follow the fixed column order
//! motion → censoring → high_pass → wm_csf → global → compcor → ica_aroma.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfoundError;

/// A family of nuisance regressors that can be requested in a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseCategory {
    Motion,
    Censoring,
    HighPass,
    WmCsf,
    Global,
    Compcor,
    IcaAroma,
}

impl NoiseCategory {
    /// Every category, in assembly order.
    pub const ALL: [NoiseCategory; 7] = [
        NoiseCategory::Motion,
        NoiseCategory::Censoring,
        NoiseCategory::HighPass,
        NoiseCategory::WmCsf,
        NoiseCategory::Global,
        NoiseCategory::Compcor,
        NoiseCategory::IcaAroma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseCategory::Motion => "motion",
            NoiseCategory::Censoring => "censoring",
            NoiseCategory::HighPass => "high_pass",
            NoiseCategory::WmCsf => "wm_csf",
            NoiseCategory::Global => "global",
            NoiseCategory::Compcor => "compcor",
            NoiseCategory::IcaAroma => "ica_aroma",
        }
    }
}

impl fmt::Display for NoiseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseCategory {
    type Err = ConfoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoiseCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                ConfoundError::InvalidStrategy(format!("{s} is not a supported type of confounds."))
            })
    }
}

/// An immutable, non-empty set of noise categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    categories: BTreeSet<NoiseCategory>,
}

impl Strategy {
    /// Parse a strategy from category names. Duplicates collapse; unknown
    /// names and empty lists are rejected.
    pub fn from_names<I, S>(names: I) -> Result<Self, ConfoundError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let categories = names
            .into_iter()
            .map(|name| name.as_ref().trim().parse::<NoiseCategory>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Self::new(categories)
    }

    pub fn new(categories: impl IntoIterator<Item = NoiseCategory>) -> Result<Self, ConfoundError> {
        let categories: BTreeSet<_> = categories.into_iter().collect();
        if categories.is_empty() {
            return Err(ConfoundError::InvalidStrategy(
                "strategy needs to be a non-empty list of confound types".into(),
            ));
        }
        Ok(Self { categories })
    }

    pub fn contains(&self, category: NoiseCategory) -> bool {
        self.categories.contains(&category)
    }

    /// Categories in assembly order.
    pub fn iter(&self) -> impl Iterator<Item = NoiseCategory> + '_ {
        self.categories.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|c| c.as_str().to_string()).collect()
    }
}
