//! Input data: raw confound tables and their sidecar metadata.

pub mod sidecar;
pub mod table;

pub use sidecar::{parse_sidecar, ComponentMeta, MaskLabel, SidecarMetadata};
pub use table::{ConfoundSource, ScanConfounds};
