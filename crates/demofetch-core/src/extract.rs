//! Member extraction from an in-memory ZIP archive.

use crate::error::{PipelineError, Result};
use crate::storage;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Output file name for an archive entry: base name (after the last `/` or
/// `\`), lower-cased. None for names that would not be a plain file name.
pub fn member_file_name(entry_name: &str) -> Option<String> {
    let base = entry_name.rsplit(['/', '\\']).next().unwrap_or("");
    match base {
        "" | "." | ".." => None,
        b => Some(b.to_lowercase()),
    }
}

/// Writes every entry of `data` whose name ends with `suffix` (case-sensitive)
/// into `dest_dir`. Returns the paths written, in archive order.
///
/// Two entries with the same base name overwrite each other; the later one wins.
pub fn extract_members(data: &[u8], suffix: &str, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut written = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !entry.name().ends_with(suffix) {
            continue;
        }
        let Some(file_name) = member_file_name(entry.name()) else {
            tracing::warn!("skipping entry with unusable name {:?}", entry.name());
            continue;
        };

        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut contents)
            .map_err(|e| PipelineError::ArchiveParse(e.into()))?;

        let out_path = dest_dir.join(&file_name);
        storage::write_file(&out_path, &contents)?;
        tracing::debug!(
            entry = entry.name(),
            path = %out_path.display(),
            bytes = contents.len(),
            "extracted member"
        );
        written.push(out_path);
    }

    Ok(written)
}
