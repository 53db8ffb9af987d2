//! Volume censoring ("scrubbing") with one-hot outlier regressors.
//!
//! A timepoint is an outlier when framewise displacement exceeds
//! `fd_thresh` or standardized DVARS exceeds `std_dvars_thresh` (strictly
//! greater; `NaN` never exceeds). Optimized mode additionally absorbs clean
//! segments shorter than `MIN_SEGMENT` timepoints (Power et al., 2014):
//! - a leading segment before the first outlier
//! - a trailing segment after the last outlier
//! - any interior segment between two outliers

use std::collections::BTreeSet;

use tracing::debug;

use super::resolve::check_params;
use super::ConfoundBlock;
use crate::config::CensoringMode;
use crate::data::ScanConfounds;
use crate::error::ConfoundError;

/// Shortest clean segment that survives optimized censoring.
pub const MIN_SEGMENT: usize = 5;

pub const FD_COLUMN: &str = "framewise_displacement";
pub const DVARS_COLUMN: &str = "std_dvars";

/// Censoring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Censor {
    pub mode: CensoringMode,
    pub fd_thresh: f64,
    pub std_dvars_thresh: f64,
}

impl Censor {
    pub fn new(mode: CensoringMode, fd_thresh: f64, std_dvars_thresh: f64) -> Self {
        Self {
            mode,
            fd_thresh,
            std_dvars_thresh,
        }
    }

    /// Sorted, unique outlier indices for a scan.
    pub fn outliers(&self, scan: &ScanConfounds) -> Result<Vec<usize>, ConfoundError> {
        check_params(scan, &[FD_COLUMN, DVARS_COLUMN])?;
        let fd = scan.values(FD_COLUMN)?;
        let dvars = scan.values(DVARS_COLUMN)?;

        let flagged = threshold_outliers(&fd, &dvars, self.fd_thresh, self.std_dvars_thresh);
        let outliers = match self.mode {
            CensoringMode::Basic => flagged,
            CensoringMode::Optimized => optimize_censoring(&flagged, scan.n_scans()),
        };
        debug!(mode = ?self.mode, outliers = outliers.len(), "censoring");
        Ok(outliers)
    }

    /// One indicator column per outlier, `motion_outlier_0`, `motion_outlier_1`, ...
    pub fn regressors(&self, scan: &ScanConfounds) -> Result<ConfoundBlock, ConfoundError> {
        let outliers = self.outliers(scan)?;
        Ok(outlier_regressors(&outliers, scan.n_scans()))
    }
}

/// Union of displacement and DVARS exceedances, sorted and deduplicated.
pub fn threshold_outliers(fd: &[f64], dvars: &[f64], fd_thresh: f64, dvars_thresh: f64) -> Vec<usize> {
    let fd_hits = fd.iter().enumerate().filter(|&(_, &v)| v > fd_thresh);
    let dvars_hits = dvars.iter().enumerate().filter(|&(_, &v)| v > dvars_thresh);
    fd_hits
        .chain(dvars_hits)
        .map(|(i, _)| i)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Absorb clean segments shorter than `MIN_SEGMENT` into the censored set.
///
/// An empty outlier set is returned unchanged.
pub fn optimize_censoring(outliers: &[usize], n_scans: usize) -> Vec<usize> {
    let mut sorted: Vec<usize> = outliers.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let Some(&first) = sorted.first() else {
        return sorted;
    };

    let mut censored: Vec<usize> = Vec::with_capacity(n_scans);
    if first < MIN_SEGMENT {
        censored.extend(0..first);
    }
    censored.append(&mut sorted);

    let last = censored[censored.len() - 1];
    if n_scans.saturating_sub(last + 1) < MIN_SEGMENT {
        censored.extend(last..n_scans);
    }

    let gaps: Vec<(usize, usize)> = censored
        .windows(2)
        .map(|w| (w[0], w[1]))
        .filter(|&(a, b)| b > a + 1 && b - a <= MIN_SEGMENT)
        .collect();
    for (a, b) in gaps {
        censored.extend(a + 1..b);
    }

    censored.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// One-hot indicator regressors, one column per outlier index.
pub fn outlier_regressors(outliers: &[usize], n_scans: usize) -> ConfoundBlock {
    let mut block = ConfoundBlock::new();
    for (k, &index) in outliers.iter().enumerate() {
        let mut values = vec![0.0; n_scans];
        if let Some(v) = values.get_mut(index) {
            *v = 1.0;
        }
        block.push(format!("motion_outlier_{k}"), values);
    }
    block
}
