//! Synthetic fMRIPrep-style confound tables shared by the integration tests.
#![allow(dead_code)]

use polars::prelude::*;

use confounds_core::{ComponentMeta, MaskLabel, ScanConfounds, SidecarMetadata};

/// Bases that carry the full derivative/power2 family in the table.
pub const EXPANDED_BASES: [&str; 9] = [
    "trans_x",
    "trans_y",
    "trans_z",
    "rot_x",
    "rot_y",
    "rot_z",
    "csf",
    "white_matter",
    "global_signal",
];

/// Masks of a_comp_cor_00..=05, in index order.
pub const ANAT_MASKS: [MaskLabel; 6] = [
    MaskLabel::Combined,
    MaskLabel::Combined,
    MaskLabel::WhiteMatter,
    MaskLabel::Csf,
    MaskLabel::WhiteMatter,
    MaskLabel::Csf,
];

pub const N_TEMPORAL: usize = 3;

fn signal(b: usize, t: usize) -> f64 {
    let freq = 0.21 + 0.07 * b as f64;
    (t as f64 * freq).sin() * 0.05 * (b + 1) as f64 + 0.01 * b as f64
}

fn derivative(values: &[f64]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| (t > 0).then(|| values[t] - values[t - 1]))
        .collect()
}

fn squared(values: &[Option<f64>]) -> Vec<Option<f64>> {
    values.iter().map(|v| v.map(|x| x * x)).collect()
}

/// Every column a scrubbing or compcor pipeline needs, `n` timepoints long.
///
/// Framewise displacement is 0.1 everywhere except `fd_spikes` (0.5);
/// standardized DVARS is 1.0 everywhere. Both are null at row 0.
pub fn synthetic_table(n: usize, fd_spikes: &[usize]) -> DataFrame {
    let mut columns = Vec::new();

    for (b, base) in EXPANDED_BASES.iter().enumerate() {
        let raw: Vec<f64> = (0..n).map(|t| signal(b, t)).collect();
        let diff = derivative(&raw);
        let raw_opt: Vec<Option<f64>> = raw.iter().copied().map(Some).collect();
        columns.push(Column::new((*base).into(), raw.clone()));
        columns.push(Column::new(format!("{base}_derivative1").into(), diff.clone()));
        columns.push(Column::new(format!("{base}_power2").into(), squared(&raw_opt)));
        columns.push(Column::new(
            format!("{base}_derivative1_power2").into(),
            squared(&diff),
        ));
    }

    let fd: Vec<Option<f64>> = (0..n)
        .map(|t| match t {
            0 => None,
            t if fd_spikes.contains(&t) => Some(0.5),
            _ => Some(0.1),
        })
        .collect();
    let dvars: Vec<Option<f64>> = (0..n).map(|t| (t > 0).then_some(1.0)).collect();
    columns.push(Column::new("framewise_displacement".into(), fd));
    columns.push(Column::new("std_dvars".into(), dvars));

    for k in 0..2 {
        let cosine: Vec<f64> = (0..n)
            .map(|t| (std::f64::consts::PI * (k + 1) as f64 * (t as f64 + 0.5) / n as f64).cos())
            .collect();
        columns.push(Column::new(format!("cosine{k:02}").into(), cosine));
    }

    for k in 0..ANAT_MASKS.len() {
        let values: Vec<f64> = (0..n).map(|t| signal(20 + k, t)).collect();
        columns.push(Column::new(format!("a_comp_cor_{k:02}").into(), values));
    }
    for k in 0..N_TEMPORAL {
        let values: Vec<f64> = (0..n).map(|t| signal(40 + k, t)).collect();
        columns.push(Column::new(format!("t_comp_cor_{k:02}").into(), values));
    }

    for k in 1..=2 {
        let values: Vec<f64> = (0..n).map(|t| signal(60 + k, t)).collect();
        columns.push(Column::new(format!("aroma_motion_{k:02}").into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Sidecar records for the compcor columns of `synthetic_table`.
pub fn synthetic_metadata() -> SidecarMetadata {
    let mut metadata = SidecarMetadata::new();
    for (k, mask) in ANAT_MASKS.iter().enumerate() {
        metadata.insert(
            format!("a_comp_cor_{k:02}"),
            ComponentMeta {
                method: Some("aCompCor".into()),
                retained: Some(true),
                ..ComponentMeta::with_mask(*mask)
            },
        );
    }
    for k in 0..N_TEMPORAL {
        metadata.insert(
            format!("t_comp_cor_{k:02}"),
            ComponentMeta {
                method: Some("tCompCor".into()),
                retained: Some(true),
                ..ComponentMeta::default()
            },
        );
    }
    metadata
}

pub fn synthetic_scan(n: usize, fd_spikes: &[usize]) -> ScanConfounds {
    ScanConfounds::new(synthetic_table(n, fd_spikes), synthetic_metadata())
}
