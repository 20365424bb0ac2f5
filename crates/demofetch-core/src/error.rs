//! Error types for the fetch → verify → extract pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while retrieving a payload (transport error or HTTP status).
#[derive(Debug, Error)]
pub enum FetchError {
    /// libcurl reported an error (DNS, connect, timeout, FTP failure, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// HTTP response had a non-2xx final status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Any other fetcher-specific failure (used by non-curl fetchers).
    #[error("{0}")]
    Other(String),
}

/// Error returned by a pipeline step. Every variant is fatal for the
/// remaining tasks of the group being processed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
        /// Where the rejected payload was written, if the write succeeded.
        preserved: Option<PathBuf>,
    },

    #[error("archive parse error: {0}")]
    ArchiveParse(#[from] zip::result::ZipError),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("illegal task state transition: {from:?} -> {to:?}")]
    IllegalTransition {
        from: crate::task::TaskState,
        to: crate::task::TaskState,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the one failure the pipeline handles explicitly (payload kept on disk).
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, PipelineError::ChecksumMismatch { .. })
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
