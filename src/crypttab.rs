use anyhow::{Context, Result};
use std::path::Path;

use crate::error::CryptbootError;

/// Resolve a mapping name to its backing device spec.
///
/// The table is line oriented (a final line without a trailing newline
/// still counts). Runs of whitespace separate columns; the first column
/// is the mapping name, the second the device spec. The first line whose
/// name matches exactly wins and scanning stops there.
pub fn resolve<'a>(mapping_name: &str, table: &'a str) -> Option<&'a str> {
    for line in table.lines() {
        let mut columns = line.split_whitespace();
        if columns.next() == Some(mapping_name) {
            return columns.next();
        }
    }
    None
}

/// Resolve from a crypttab file on disk.
///
/// An unreadable table or an absent mapping is fatal: without the boot
/// mapping nothing else can proceed.
pub fn resolve_file(mapping_name: &str, path: &Path) -> Result<String> {
    let table = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    resolve(mapping_name, &table)
        .map(str::to_owned)
        .ok_or_else(|| {
            CryptbootError::ConfigError(format!(
                "mapping '{}' not found in {}",
                mapping_name,
                path.display()
            ))
            .into()
        })
}
