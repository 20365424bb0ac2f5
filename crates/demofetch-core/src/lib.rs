//! Fetch, verify and extract the C&C demo MIX archives.

pub mod config;
pub mod logging;

pub mod checksum;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod pipeline;
pub mod progress;
pub mod storage;
pub mod task;
pub mod verify;

pub use error::{FetchError, PipelineError};
pub use fetcher::{CurlFetcher, Fetch, FetchOptions};
pub use pipeline::{run_group, run_task, GroupOutcome, PipelineSettings, TaskFailure, TaskReport};
pub use task::{DemoSet, DownloadTask, TaskGroup, TaskState};
pub use verify::verify_download;
