//! Tracing setup for the fetch utilities.
//!
//! Events go to `~/.local/state/demofetch/demofetch.log`. When that file cannot
//! be opened the subscriber writes to stderr instead, so a read-only home
//! never stops a download. Console progress lines are not log events.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,demofetch_core=debug,demofetch_cli=debug";
const LOG_FILE_NAME: &str = "demofetch.log";

/// Where log events ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    File(PathBuf),
    Stderr,
}

/// Directory for the log file: `$XDG_STATE_HOME/demofetch`.
pub fn log_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("demofetch")?;
    Ok(xdg_dirs.get_state_home().join("demofetch"))
}

/// Creates `dir` if needed and opens the log file in append mode.
pub fn open_log_file(dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    Ok((path, file))
}

fn install(writer: BoxMakeWriter) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
}

/// Installs the global subscriber and reports which sink it writes to.
pub fn init() -> LogSink {
    match log_dir().and_then(|dir| open_log_file(&dir)) {
        Ok((path, file)) => {
            install(BoxMakeWriter::new(Mutex::new(file)));
            tracing::info!("demofetch logging initialized at {}", path.display());
            LogSink::File(path)
        }
        Err(e) => {
            install(BoxMakeWriter::new(std::io::stderr));
            tracing::warn!("log file unavailable, logging to stderr: {:#}", e);
            LogSink::Stderr
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_log_file_creates_dir_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state").join("demofetch");

        let (path, mut file) = open_log_file(&nested).unwrap();
        assert_eq!(path, nested.join("demofetch.log"));
        file.write_all(b"first\n").unwrap();
        drop(file);

        let (_, mut again) = open_log_file(&nested).unwrap();
        again.write_all(b"second\n").unwrap();
        drop(again);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn open_log_file_fails_under_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("state");
        std::fs::write(&blocker, b"x").unwrap();
        assert!(open_log_file(&blocker.join("demofetch")).is_err());
    }
}
