//! Per-snapshot JSON documents

use crate::model::ArchiveSnapshot;
use crate::output::error::OutputResult;
use std::path::{Path, PathBuf};

/// Writes one snapshot tree to `{dir}/{snapshot_id}.json`
///
/// Characters that are awkward in file names (such as the `:` of a
/// `host:port` id) are replaced with `_`.
pub fn write_snapshot_json(dir: &Path, snapshot: &ArchiveSnapshot) -> OutputResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let file_name: String = snapshot
        .snapshot_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    let path = dir.join(format!("{}.json", file_name));

    std::fs::write(&path, serde_json::to_string_pretty(snapshot)?)?;
    tracing::debug!("Wrote snapshot {} to {}", snapshot.snapshot_id, path.display());

    Ok(path)
}
