//! Batch loading across scans.
//!
//! Output arity mirrors input arity: one scan in, one matrix out; a list in,
//! a list out in input order. Multi-scan batches fan out over rayon unless
//! the engine was built with `with_parallelism(false)`.
//!
//! `load_batch`/`load_many` are fail-fast: any scan's error becomes the batch
//! error and no partial list is returned. With parallelism on, which error
//! wins when several scans fail is not specified. `load_each` is the
//! collect-all variant.

use rayon::prelude::*;

use super::{ConfoundMatrix, StrategyEngine};
use crate::data::ScanConfounds;
use crate::error::ConfoundError;

/// A single item or an ordered list of items.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a list, regardless of arity.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl StrategyEngine {
    /// Load one scan or a list of scans, mirroring the input's shape.
    pub fn load_batch(
        &self,
        input: OneOrMany<&ScanConfounds>,
    ) -> Result<OneOrMany<ConfoundMatrix>, ConfoundError> {
        match input {
            OneOrMany::One(scan) => self.load(scan).map(OneOrMany::One),
            OneOrMany::Many(scans) => self.load_many(&scans).map(OneOrMany::Many),
        }
    }

    /// Load every scan, in input order. Fails on the first error.
    pub fn load_many<S>(&self, scans: &[S]) -> Result<Vec<ConfoundMatrix>, ConfoundError>
    where
        S: AsRef<ScanConfounds> + Sync,
    {
        if self.parallel {
            scans
                .par_iter()
                .map(|scan| self.load(scan.as_ref()))
                .collect()
        } else {
            scans.iter().map(|scan| self.load(scan.as_ref())).collect()
        }
    }

    /// Load every scan and keep each outcome, in input order.
    pub fn load_each<S>(&self, scans: &[S]) -> Vec<Result<ConfoundMatrix, ConfoundError>>
    where
        S: AsRef<ScanConfounds> + Sync,
    {
        if self.parallel {
            scans
                .par_iter()
                .map(|scan| self.load(scan.as_ref()))
                .collect()
        } else {
            scans.iter().map(|scan| self.load(scan.as_ref())).collect()
        }
    }
}
