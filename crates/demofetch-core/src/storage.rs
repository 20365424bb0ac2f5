//! Disk side of the pipeline: destination directories and whole-file writes.
//!
//! Files are written to a `.part` sibling first and renamed into place, so an
//! interrupted run never leaves a truncated member under its final name.

use crate::error::{PipelineError, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `conquer.mix` -> `conquer.mix.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Creates `path` and its parents if missing. An existing directory is fine;
/// an existing non-directory or any other failure is an error.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| PipelineError::io(path, e))?;
    tracing::debug!("created directory {}", path.display());
    Ok(())
}

/// Writes `data` to `final_path` via a temp file and rename. Overwrites an existing file.
pub fn write_file(final_path: &Path, data: &[u8]) -> Result<()> {
    let tp = temp_path(final_path);
    let res = (|| -> std::io::Result<()> {
        let mut f = File::create(&tp)?;
        f.write_all(data)?;
        f.sync_all()?;
        Ok(())
    })();
    if let Err(e) = res {
        let _ = std::fs::remove_file(&tp);
        return Err(PipelineError::io(&tp, e));
    }
    std::fs::rename(&tp, final_path).map_err(|e| PipelineError::io(final_path, e))
}
