//! Column lookup: exact names or keyword substrings.

use super::ConfoundBlock;
use crate::data::ScanConfounds;
use crate::error::ConfoundError;

/// Fail with `MissingParameter` on the first expected column the table lacks.
pub fn check_params<S: AsRef<str>>(scan: &ScanConfounds, params: &[S]) -> Result<(), ConfoundError> {
    match params.iter().find(|p| !scan.has_column(p.as_ref())) {
        Some(missing) => Err(ConfoundError::missing(missing.as_ref())),
        None => Ok(()),
    }
}

/// Read the named columns as a block, in the given order.
///
/// Presence of every column is checked before any value is read.
pub fn select_columns<S: AsRef<str>>(
    scan: &ScanConfounds,
    params: &[S],
) -> Result<ConfoundBlock, ConfoundError> {
    check_params(scan, params)?;
    let mut block = ConfoundBlock::new();
    for param in params {
        let name = param.as_ref();
        block.push(name, scan.values(name)?);
    }
    Ok(block)
}

/// Every column whose name contains a keyword, keyword by keyword, in table
/// order. A keyword with no match is an error.
pub fn find_confounds(scan: &ScanConfounds, keywords: &[&str]) -> Result<Vec<String>, ConfoundError> {
    let columns = scan.column_names();
    let mut found = Vec::new();
    for keyword in keywords {
        let before = found.len();
        found.extend(columns.iter().filter(|c| c.contains(keyword)).cloned());
        if found.len() == before {
            return Err(ConfoundError::NoMatchingConfound {
                keyword: keyword.to_string(),
            });
        }
    }
    Ok(found)
}

/// Keyword lookup followed by a read of the matched columns.
pub fn select_keywords(scan: &ScanConfounds, keywords: &[&str]) -> Result<ConfoundBlock, ConfoundError> {
    let names = find_confounds(scan, keywords)?;
    select_columns(scan, &names)
}
