//! Sidecar metadata for component-noise columns.
//!
//! fMRIPrep writes one JSON record per derived regressor. Only the compcor
//! records matter here; every field is optional so cosine/AROMA entries
//! (which carry none of them) still parse.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Spatial mask a compcor component was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskLabel {
    #[serde(rename = "WM")]
    WhiteMatter,
    #[serde(rename = "CSF")]
    Csf,
    #[serde(rename = "combined")]
    Combined,
    #[serde(other)]
    Other,
}

/// One sidecar record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComponentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<MaskLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retained: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance_explained: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cumulative_variance_explained: Option<f64>,
}

impl ComponentMeta {
    pub fn with_mask(mask: MaskLabel) -> Self {
        Self {
            mask: Some(mask),
            ..Default::default()
        }
    }
}

/// Column name → sidecar record.
pub type SidecarMetadata = BTreeMap<String, ComponentMeta>;

/// Parse a sidecar JSON document into metadata.
pub fn parse_sidecar(json: &str) -> Result<SidecarMetadata, serde_json::Error> {
    serde_json::from_str(json)
}
