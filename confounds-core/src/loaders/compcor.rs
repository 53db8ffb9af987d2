//! CompCor component selection.
//!
//! Components are named `<prefix>_comp_cor_<NN>` with prefix `a`
//! (anatomical) or `t` (temporal). The pipeline orders them by explained
//! variance, so selection keeps index order and truncation takes the head.
//!
//! Anatomical components are filtered by the sidecar's `Mask` label:
//! the combined mask alone, or WM followed by CSF. Temporal components are
//! never mask-filtered. Each mask's list is truncated independently, so
//! `Exactly(n)` with separate masks yields up to `n` WM plus `n` CSF.

use tracing::warn;

use super::resolve::select_columns;
use super::ConfoundBlock;
use crate::config::{CompcorCount, CompcorVariant};
use crate::data::{MaskLabel, ScanConfounds, SidecarMetadata};
use crate::error::ConfoundError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Anatomical,
    Temporal,
}

impl Prefix {
    fn as_str(&self) -> &'static str {
        match self {
            Prefix::Anatomical => "a",
            Prefix::Temporal => "t",
        }
    }
}

/// Keep the first `count` entries of `columns`.
fn truncate(mut columns: Vec<String>, count: CompcorCount) -> Vec<String> {
    if let CompcorCount::Exactly(n) = count {
        if n < columns.len() {
            columns.truncate(n);
        } else if n > columns.len() {
            warn!(
                requested = n,
                available = columns.len(),
                "fewer compcor components than requested, keeping all"
            );
        }
    }
    columns
}

/// Enumerate one prefix's components in index order.
///
/// `mask` only applies to anatomical components.
fn label_compcor(
    metadata: &SidecarMetadata,
    prefix: Prefix,
    mask: Option<MaskLabel>,
    count: CompcorCount,
) -> Vec<String> {
    let tag = format!("{}_comp_cor", prefix.as_str());
    let total = metadata.keys().filter(|k| k.contains(&tag)).count();

    let columns = (0..total)
        .map(|nn| format!("{tag}_{nn:02}"))
        .filter(|name| match (prefix, mask) {
            (Prefix::Temporal, _) | (Prefix::Anatomical, None) => true,
            (Prefix::Anatomical, Some(mask)) => {
                metadata.get(name).and_then(|m| m.mask) == Some(mask)
            }
        })
        .collect();

    truncate(columns, count)
}

fn anatomical_columns(metadata: &SidecarMetadata, combined: bool, count: CompcorCount) -> Vec<String> {
    if combined {
        label_compcor(metadata, Prefix::Anatomical, Some(MaskLabel::Combined), count)
    } else {
        let mut columns = label_compcor(metadata, Prefix::Anatomical, Some(MaskLabel::WhiteMatter), count);
        columns.extend(label_compcor(metadata, Prefix::Anatomical, Some(MaskLabel::Csf), count));
        columns
    }
}

/// Component column names for a variant, anatomical before temporal.
pub fn compcor_columns(
    metadata: &SidecarMetadata,
    variant: CompcorVariant,
    combined: bool,
    count: CompcorCount,
) -> Vec<String> {
    match variant {
        CompcorVariant::Anat => anatomical_columns(metadata, combined, count),
        CompcorVariant::Temp => label_compcor(metadata, Prefix::Temporal, None, count),
        CompcorVariant::Full => {
            let mut columns = anatomical_columns(metadata, combined, count);
            columns.extend(label_compcor(metadata, Prefix::Temporal, None, count));
            columns
        }
    }
}

/// Select compcor regressors from a scan.
///
/// Fails with `MissingParameter` when the sidecar lists a component the
/// table does not carry.
pub fn load_compcor(
    scan: &ScanConfounds,
    variant: CompcorVariant,
    combined: bool,
    count: CompcorCount,
) -> Result<ConfoundBlock, ConfoundError> {
    let columns = compcor_columns(&scan.metadata, variant, combined, count);
    select_columns(scan, &columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ComponentMeta;

    /// a_comp_cor_00..=05: combined, combined, WM, CSF, WM, CSF; t_comp_cor_00..=02.
    fn metadata() -> SidecarMetadata {
        let masks = [
            MaskLabel::Combined,
            MaskLabel::Combined,
            MaskLabel::WhiteMatter,
            MaskLabel::Csf,
            MaskLabel::WhiteMatter,
            MaskLabel::Csf,
        ];
        let mut meta = SidecarMetadata::new();
        for (i, mask) in masks.into_iter().enumerate() {
            meta.insert(format!("a_comp_cor_{i:02}"), ComponentMeta::with_mask(mask));
        }
        for i in 0..3 {
            meta.insert(format!("t_comp_cor_{i:02}"), ComponentMeta::default());
        }
        meta.insert("cosine00".into(), ComponentMeta::default());
        meta
    }

    #[test]
    fn combined_mask_only() {
        let cols = compcor_columns(&metadata(), CompcorVariant::Anat, true, CompcorCount::All);
        assert_eq!(cols, vec!["a_comp_cor_00", "a_comp_cor_01"]);
    }

    #[test]
    fn separate_masks_put_wm_before_csf() {
        let cols = compcor_columns(&metadata(), CompcorVariant::Anat, false, CompcorCount::All);
        assert_eq!(
            cols,
            vec!["a_comp_cor_02", "a_comp_cor_04", "a_comp_cor_03", "a_comp_cor_05"]
        );
    }

    #[test]
    fn separate_masks_truncate_per_mask() {
        let cols = compcor_columns(&metadata(), CompcorVariant::Anat, false, CompcorCount::Exactly(1));
        assert_eq!(cols, vec!["a_comp_cor_02", "a_comp_cor_03"]);
    }

    #[test]
    fn temporal_ignores_masks_and_combine_flag() {
        for combined in [true, false] {
            let cols = compcor_columns(&metadata(), CompcorVariant::Temp, combined, CompcorCount::All);
            assert_eq!(cols, vec!["t_comp_cor_00", "t_comp_cor_01", "t_comp_cor_02"]);
        }
    }

    #[test]
    fn full_unions_anatomical_then_temporal_each_truncated() {
        let cols = compcor_columns(&metadata(), CompcorVariant::Full, true, CompcorCount::Exactly(2));
        assert_eq!(
            cols,
            vec!["a_comp_cor_00", "a_comp_cor_01", "t_comp_cor_00", "t_comp_cor_01"]
        );
    }

    #[test]
    fn count_above_available_keeps_all() {
        let cols = compcor_columns(&metadata(), CompcorVariant::Temp, true, CompcorCount::Exactly(10));
        assert_eq!(cols.len(), 3);
    }

    #[test]
    fn no_components_yields_empty_list() {
        let cols = compcor_columns(&SidecarMetadata::new(), CompcorVariant::Full, true, CompcorCount::All);
        assert!(cols.is_empty());
    }
}
