//! Suffix expansion of base confound names.

use crate::config::SubModel;

/// Expand base names into the full variant list for a sub-model.
///
/// Base names come first in their given order, followed by each base's
/// suffixed variants (`_derivative1`, `_power2`, `_derivative1_power2`).
pub fn expand_params<S: AsRef<str>>(params: &[S], model: SubModel) -> Vec<String> {
    let suffixes = model.suffixes();
    let mut full: Vec<String> = params.iter().map(|p| p.as_ref().to_string()).collect();
    for param in params {
        for suffix in suffixes {
            full.push(format!("{}_{suffix}", param.as_ref()));
        }
    }
    full
}
