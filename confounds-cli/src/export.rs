//! Output artifacts: the selected-confounds TSV and its provenance JSON.
//!
//! For a confounds file `<stem>_desc-confounds_timeseries.tsv` the outputs
//! are written under the output directory as:
//! - `<stem>_desc-selected_confounds.tsv`: one column per regressor
//! - `<stem>_desc-selected_confounds.json`: configuration, hash, labels

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use confounds_core::{ConfoundConfig, ConfoundMatrix};

pub const OUTPUT_SUFFIX: &str = "_desc-selected_confounds";

/// What produced a selected-confounds file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Confounds TSV the matrix was read from.
    pub source: PathBuf,
    pub config: ConfoundConfig,
    pub config_hash: String,
    pub labels: Vec<String>,
    pub n_rows: usize,
}

impl Provenance {
    pub fn new(source: &Path, config: &ConfoundConfig, matrix: &ConfoundMatrix) -> Self {
        Self {
            source: source.to_path_buf(),
            config: config.clone(),
            config_hash: config.config_hash(),
            labels: matrix.labels.clone(),
            n_rows: matrix.n_rows(),
        }
    }
}

/// Tab-separated matrix with a label header. `NaN` is written as `n/a`.
pub fn export_tsv(matrix: &ConfoundMatrix) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(vec![]);
    wtr.write_record(&matrix.labels)?;
    for row in matrix.values.row_iter() {
        wtr.write_record(row.iter().map(|v| {
            if v.is_nan() {
                "n/a".to_string()
            } else {
                v.to_string()
            }
        }))?;
    }
    let data = wtr.into_inner().context("failed to flush TSV writer")?;
    String::from_utf8(data).context("TSV output is not valid UTF-8")
}

pub fn export_json(provenance: &Provenance) -> Result<String> {
    serde_json::to_string_pretty(provenance).context("failed to serialize provenance to JSON")
}

/// Write both artifacts for one scan. Returns the TSV path.
pub fn save_outputs(
    matrix: &ConfoundMatrix,
    provenance: &Provenance,
    output_dir: &Path,
    stem: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let tsv_path = output_dir.join(format!("{stem}{OUTPUT_SUFFIX}.tsv"));
    std::fs::write(&tsv_path, export_tsv(matrix)?)
        .with_context(|| format!("failed to write {}", tsv_path.display()))?;

    let json_path = tsv_path.with_extension("json");
    std::fs::write(&json_path, export_json(provenance)?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    Ok(tsv_path)
}
