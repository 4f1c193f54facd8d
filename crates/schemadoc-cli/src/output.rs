//! Descriptor file naming and writing.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name for a table-mode run: `{table_id}.yaml`, where the table
/// id is the identifier exactly as the operator supplied it.
pub fn table_filename(table_id: &str) -> String {
    format!("{table_id}.yaml")
}

/// File name for one table of a dataset-mode run:
/// `{dataset_id}.{table_name}.yaml`.
pub fn dataset_table_filename(dataset_id: &str, table_name: &str) -> String {
    format!("{dataset_id}.{table_name}.yaml")
}

/// Write descriptor text into `dir`, creating the directory if absent.
///
/// Existing files are overwritten silently; there is no collision
/// detection.
pub fn write_descriptor(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(filename);
    fs::write(&path, content)
        .with_context(|| format!("Failed to write descriptor to {}", path.display()))?;
    Ok(path)
}
