//! Download → verify → extract, one task at a time.
//!
//! The pipeline never changes the working directory: destination and fallback
//! paths come from `PipelineSettings`.

use crate::config::DemofetchConfig;
use crate::error::{PipelineError, Result};
use crate::extract::extract_members;
use crate::fetcher::Fetch;
use crate::progress::ConsoleProgress;
use crate::storage::ensure_dir_exists;
use crate::task::{DownloadTask, TaskGroup, TaskState};
use crate::verify::verify_download;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where a group's output goes.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Parent of the per-group directories.
    pub data_root: PathBuf,
    /// Explicit fallback path; defaults to `<data_root>/<fallback_file_name>`.
    pub fallback_path: Option<PathBuf>,
    pub fallback_file_name: String,
    pub member_suffix: String,
}

impl PipelineSettings {
    pub fn from_config(cfg: &DemofetchConfig) -> Self {
        Self {
            data_root: cfg.data_root.clone(),
            fallback_path: None,
            fallback_file_name: cfg.fallback_file_name.clone(),
            member_suffix: cfg.member_suffix.clone(),
        }
    }

    pub fn group_dir(&self, group: &TaskGroup) -> PathBuf {
        self.data_root.join(&group.dir_name)
    }

    /// Rejected payloads land one level above the group directory.
    pub fn fallback_path_for(&self, group_dir: &Path) -> PathBuf {
        if let Some(p) = &self.fallback_path {
            return p.clone();
        }
        group_dir
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.fallback_file_name)
    }
}

/// Outcome of one task that ran to a terminal state.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub url: String,
    pub state: TaskState,
    pub bytes_fetched: u64,
    pub extracted: Vec<PathBuf>,
}

/// A task that ended in `TaskState::Failed`, with what it got done before failing.
#[derive(Debug)]
pub struct TaskFailure {
    pub report: TaskReport,
    pub error: PipelineError,
}

/// Everything a group run produced: one report per attempted task, and the
/// error that stopped the group, if any.
#[derive(Debug, Default)]
pub struct GroupOutcome {
    pub reports: Vec<TaskReport>,
    pub error: Option<PipelineError>,
}

impl GroupOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Process exit status: 0 when every task was extracted.
    pub fn exit_code(&self) -> i32 {
        self.error.as_ref().map_or(0, PipelineError::exit_code)
    }

    /// Reports of the tasks that reached `Extracted`.
    pub fn completed(&self) -> impl Iterator<Item = &TaskReport> {
        self.reports
            .iter()
            .filter(|r| r.state == TaskState::Extracted)
    }

    pub fn into_result(self) -> Result<Vec<TaskReport>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.reports),
        }
    }
}

/// Tracks one task's state and what it has produced so far.
struct Tracker<'a> {
    url: &'a str,
    state: TaskState,
    bytes_fetched: u64,
    extracted: Vec<PathBuf>,
}

impl<'a> Tracker<'a> {
    fn new(url: &'a str) -> Self {
        Self {
            url,
            state: TaskState::Pending,
            bytes_fetched: 0,
            extracted: Vec::new(),
        }
    }

    fn to(&mut self, next: TaskState) -> Result<()> {
        self.state = self.state.advance(next)?;
        tracing::debug!(url = self.url, state = ?self.state, "task state");
        Ok(())
    }

    fn report(&self) -> TaskReport {
        TaskReport {
            url: self.url.to_string(),
            state: self.state,
            bytes_fetched: self.bytes_fetched,
            extracted: self.extracted.clone(),
        }
    }

    /// Moves to `Failed` and packages the error with the partial report.
    fn fail(mut self, error: PipelineError) -> TaskFailure {
        tracing::error!(url = self.url, "task failed: {}", error);
        if let Err(e) = self.to(TaskState::Failed) {
            tracing::warn!(url = self.url, "{}", e);
        }
        TaskFailure {
            report: self.report(),
            error,
        }
    }
}

fn execute(
    tracker: &mut Tracker<'_>,
    task: &DownloadTask,
    dest_dir: &Path,
    fallback_path: &Path,
    suffix: &str,
    fetcher: &dyn Fetch,
    console: &mut dyn Write,
) -> Result<()> {
    let url = tracker.url;

    tracker.to(TaskState::Downloading)?;
    tracing::info!(url, expected_size = task.expected_size(), "downloading");
    let fetched = {
        let mut progress = ConsoleProgress::new(&mut *console, url, task.expected_size());
        let _ = progress.update(0);
        let mut on_progress = |bytes: u64| {
            let _ = progress.update(bytes);
        };
        let fetched = fetcher.fetch(task.url(), &mut on_progress);
        let _ = progress.finish();
        fetched
    };
    let data = fetched.map_err(|source| PipelineError::Network {
        url: url.to_string(),
        source,
    })?;
    tracker.bytes_fetched = data.len() as u64;

    tracker.to(TaskState::Verifying)?;
    verify_download(url, &data, task.digest(), fallback_path, console)?;

    tracker.to(TaskState::Extracting)?;
    tracker.extracted = extract_members(&data, suffix, dest_dir)?;
    let _ = writeln!(console, "Extracting: done");
    tracker.to(TaskState::Extracted)?;
    tracing::info!(url, files = tracker.extracted.len(), "extracted");
    Ok(())
}

/// Runs a single task: fetch into memory, verify, extract into `dest_dir`.
pub fn run_task(
    task: &DownloadTask,
    dest_dir: &Path,
    fallback_path: &Path,
    suffix: &str,
    fetcher: &dyn Fetch,
    console: &mut dyn Write,
) -> std::result::Result<TaskReport, TaskFailure> {
    let mut tracker = Tracker::new(task.url().as_str());
    match execute(
        &mut tracker,
        task,
        dest_dir,
        fallback_path,
        suffix,
        fetcher,
        console,
    ) {
        Ok(()) => Ok(tracker.report()),
        Err(e) => Err(tracker.fail(e)),
    }
}

/// Runs every task of `group` in order, stopping at the first failure.
/// Reports of tasks finished before the failure are kept in the outcome.
pub fn run_group(
    group: &TaskGroup,
    settings: &PipelineSettings,
    fetcher: &dyn Fetch,
    console: &mut dyn Write,
) -> GroupOutcome {
    let mut outcome = GroupOutcome::default();
    let dest_dir = settings.group_dir(group);
    if let Err(e) = ensure_dir_exists(&dest_dir) {
        outcome.error = Some(e);
        return outcome;
    }
    let fallback_path = settings.fallback_path_for(&dest_dir);

    let _ = writeln!(console, "Attempting to download {}...", group.description);
    tracing::info!(
        group = %group.dir_name,
        tasks = group.tasks.len(),
        dest = %dest_dir.display(),
        "starting group"
    );

    for task in &group.tasks {
        match run_task(
            task,
            &dest_dir,
            &fallback_path,
            &settings.member_suffix,
            fetcher,
            console,
        ) {
            Ok(report) => outcome.reports.push(report),
            Err(failure) => {
                outcome.reports.push(failure.report);
                outcome.error = Some(failure.error);
                break;
            }
        }
    }
    outcome
}
