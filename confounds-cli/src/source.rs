//! File-backed confound source.
//!
//! Accepts either a confounds TSV directly or a preprocessed BOLD image
//! (`.nii`/`.nii.gz`). Image paths map to the sibling confounds file by
//! replacing everything from `_space-` on:
//! - `_desc-confounds_timeseries.tsv` (current fMRIPrep naming)
//! - `_desc-confounds_regressors.tsv` (fMRIPrep <= 20.1, used when the
//!   current name does not exist)
//!
//! The sidecar sits next to the TSV with a `.json` extension.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use confounds_core::data::parse_sidecar;
use confounds_core::{ConfoundSource, ScanConfounds};

pub const TIMESERIES_SUFFIX: &str = "_desc-confounds_timeseries.tsv";
pub const LEGACY_SUFFIX: &str = "_desc-confounds_regressors.tsv";

const NULL_TOKEN: &str = "n/a";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot locate confounds for {}: no '_space-' entity in the file name", .0.display())]
    NoSpaceEntity(PathBuf),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse confounds table {}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("failed to parse sidecar {}: {source}", path.display())]
    Sidecar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads fMRIPrep confound files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FileSource {
    /// Map an input path to the confounds TSV it refers to.
    pub fn locate(&self, input: &Path) -> Result<PathBuf, SourceError> {
        let name = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if !is_image(name) {
            return Ok(input.to_path_buf());
        }

        let base = name
            .find("_space-")
            .map(|pos| &name[..pos])
            .ok_or_else(|| SourceError::NoSpaceEntity(input.to_path_buf()))?;

        let current = input.with_file_name(format!("{base}{TIMESERIES_SUFFIX}"));
        if current.exists() {
            return Ok(current);
        }
        let legacy = input.with_file_name(format!("{base}{LEGACY_SUFFIX}"));
        debug!(path = %legacy.display(), "falling back to legacy confounds name");
        Ok(legacy)
    }
}

impl ConfoundSource for FileSource {
    type Handle = PathBuf;
    type Error = SourceError;

    fn resolve(&self, input: &PathBuf) -> Result<ScanConfounds, SourceError> {
        let tsv = self.locate(input)?;
        if !tsv.exists() {
            return Err(SourceError::NotFound(tsv));
        }
        let table = read_table(&tsv)?;
        let metadata = {
            let path = sidecar_path(&tsv);
            if !path.exists() {
                return Err(SourceError::NotFound(path));
            }
            let json = std::fs::read_to_string(&path).map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;
            parse_sidecar(&json).map_err(|source| SourceError::Sidecar { path, source })?
        };
        debug!(
            path = %tsv.display(),
            rows = table.height(),
            columns = table.width(),
            sidecar_entries = metadata.len(),
            "read confounds"
        );
        Ok(ScanConfounds::new(table, metadata))
    }
}

fn is_image(name: &str) -> bool {
    name.ends_with(".nii") || name.ends_with(".nii.gz")
}

pub fn sidecar_path(tsv: &Path) -> PathBuf {
    tsv.with_extension("json")
}

/// File name of a confounds TSV without its `_desc-confounds_*` suffix.
pub fn output_stem(tsv: &Path) -> String {
    let name = tsv
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    [TIMESERIES_SUFFIX, LEGACY_SUFFIX]
        .iter()
        .find_map(|suffix| name.strip_suffix(*suffix))
        .or_else(|| name.strip_suffix(".tsv"))
        .unwrap_or(name)
        .to_string()
}

/// Read a tab-separated confounds table. `n/a` cells become nulls.
pub fn read_table(path: &Path) -> Result<DataFrame, SourceError> {
    let table_err = |source| SourceError::Table {
        path: path.to_path_buf(),
        source,
    };
    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(b'\t')
        .with_null_values(Some(NullValues::AllColumnsSingle(NULL_TOKEN.into())))
        .with_infer_schema_length(None)
        .finish()
        .map_err(table_err)?
        .collect()
        .map_err(table_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TABLE: &str = "csf\twhite_matter\tcsf_derivative1\n\
                         1.0\t4.0\tn/a\n\
                         2.0\t5.0\t1.0\n\
                         3.0\t6.0\t1.0\n";

    const SIDECAR: &str = r#"{"a_comp_cor_00": {"Mask": "combined", "Method": "aCompCor"}}"#;

    fn write_pair(dir: &Path, stem: &str, suffix: &str) -> PathBuf {
        let tsv = dir.join(format!("{stem}{suffix}"));
        std::fs::write(&tsv, TABLE).unwrap();
        std::fs::write(sidecar_path(&tsv), SIDECAR).unwrap();
        tsv
    }

    #[test]
    fn tsv_input_is_used_as_is() {
        let path = PathBuf::from("/data/sub-01_task-rest_desc-confounds_timeseries.tsv");
        assert_eq!(FileSource.locate(&path).unwrap(), path);
    }

    #[test]
    fn image_maps_to_timeseries_file() {
        let dir = TempDir::new().unwrap();
        let tsv = write_pair(dir.path(), "sub-01_task-rest", TIMESERIES_SUFFIX);
        let image = dir
            .path()
            .join("sub-01_task-rest_space-MNI152NLin2009cAsym_desc-preproc_bold.nii.gz");
        assert_eq!(FileSource.locate(&image).unwrap(), tsv);
    }

    #[test]
    fn image_falls_back_to_legacy_name() {
        let dir = TempDir::new().unwrap();
        let tsv = write_pair(dir.path(), "sub-02_task-rest", LEGACY_SUFFIX);
        let image = dir.path().join("sub-02_task-rest_space-T1w_desc-preproc_bold.nii");
        assert_eq!(FileSource.locate(&image).unwrap(), tsv);
    }

    #[test]
    fn image_without_space_entity_is_rejected() {
        let image = PathBuf::from("sub-01_task-rest_bold.nii.gz");
        assert!(matches!(
            FileSource.locate(&image),
            Err(SourceError::NoSpaceEntity(_))
        ));
    }

    #[test]
    fn resolve_reads_table_and_sidecar() {
        let dir = TempDir::new().unwrap();
        let tsv = write_pair(dir.path(), "sub-01_task-rest", TIMESERIES_SUFFIX);

        let scan = FileSource.resolve(&tsv).unwrap();
        assert_eq!(scan.n_scans(), 3);
        assert_eq!(scan.column_names(), vec!["csf", "white_matter", "csf_derivative1"]);
        assert!(scan.values("csf_derivative1").unwrap()[0].is_nan());
        assert!(scan.metadata.contains_key("a_comp_cor_00"));
    }

    #[test]
    fn missing_sidecar_is_not_found() {
        let dir = TempDir::new().unwrap();
        let tsv = dir.path().join("sub-03_desc-confounds_timeseries.tsv");
        std::fs::write(&tsv, TABLE).unwrap();
        match FileSource.resolve(&tsv) {
            Err(SourceError::NotFound(path)) => assert_eq!(path, sidecar_path(&tsv)),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn stems_drop_confounds_suffix() {
        assert_eq!(
            output_stem(Path::new("a/sub-01_task-rest_desc-confounds_timeseries.tsv")),
            "sub-01_task-rest"
        );
        assert_eq!(
            output_stem(Path::new("sub-01_desc-confounds_regressors.tsv")),
            "sub-01"
        );
        assert_eq!(output_stem(Path::new("custom.tsv")), "custom");
    }
}
