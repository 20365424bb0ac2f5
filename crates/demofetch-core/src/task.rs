//! Task definitions: what to fetch, how big it is, and what it must hash to.

use crate::checksum::ExpectedDigest;
use crate::error::{PipelineError, Result};
use url::Url;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// One archive to fetch. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    url: Url,
    /// Used for progress display only; not enforced.
    expected_size: u64,
    digest: ExpectedDigest,
}

impl DownloadTask {
    /// Builds a task, validating the URL scheme and the digest encoding.
    pub fn new(url: &str, expected_size: u64, digest: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| PipelineError::InvalidTask(format!("bad URL {:?}: {}", url, e)))?;
        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(PipelineError::InvalidTask(format!(
                "unsupported scheme {:?} in {}",
                url.scheme(),
                url
            )));
        }
        let digest = ExpectedDigest::parse(digest).map_err(PipelineError::InvalidTask)?;
        Ok(Self {
            url,
            expected_size,
            digest,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn expected_size(&self) -> u64 {
        self.expected_size
    }

    pub fn digest(&self) -> &ExpectedDigest {
        &self.digest
    }
}

/// Ordered tasks handled by one utility, all extracted into one directory.
#[derive(Debug, Clone)]
pub struct TaskGroup {
    /// Human-readable name used in console output.
    pub description: String,
    /// Sub-directory of the data root the members land in.
    pub dir_name: String,
    pub tasks: Vec<DownloadTask>,
}

/// The two fixed archive sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSet {
    TiberianDawn,
    RedAlert,
}

impl DemoSet {
    /// Builds the static task list for this set.
    pub fn group(self) -> Result<TaskGroup> {
        match self {
            DemoSet::TiberianDawn => Ok(TaskGroup {
                description: "Tiberian Dawn demo mix files".to_string(),
                dir_name: "td".to_string(),
                tasks: vec![
                    DownloadTask::new(
                        "ftp://ftp.westwood.com/pub/cc1/previews/demo/cc1demo1.zip",
                        9_367_945,
                        "7d770d38618e20796fbe642037f08de5",
                    )?,
                    DownloadTask::new(
                        "ftp://ftp.westwood.com/pub/cc1/previews/demo/cc1demo2.zip",
                        17_797_920,
                        "bbe489d259c4e6d6cadb4a2544b764aa",
                    )?,
                ],
            }),
            DemoSet::RedAlert => Ok(TaskGroup {
                description: "Red Alert demo mix files".to_string(),
                dir_name: "ra".to_string(),
                tasks: vec![DownloadTask::new(
                    "ftp://ftp.westwood.com/pub/redalert/previews/demo/ra95demo.zip",
                    27_076_646,
                    "b44ab9ec1bc634ea755587d1988e3722",
                )?],
            }),
        }
    }
}

/// Lifecycle of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Downloading,
    Verifying,
    Extracting,
    Extracted,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Extracted | TaskState::Failed)
    }

    /// Returns the next state, or an error if `next` is not reachable from `self`.
    pub fn advance(self, next: TaskState) -> Result<TaskState> {
        use TaskState::*;
        let ok = matches!(
            (self, next),
            (Pending, Downloading)
                | (Downloading, Verifying)
                | (Verifying, Extracting)
                | (Extracting, Extracted)
                | (Downloading, Failed)
                | (Verifying, Failed)
                | (Extracting, Failed)
        );
        if ok {
            Ok(next)
        } else {
            Err(PipelineError::IllegalTransition {
                from: self,
                to: next,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::DigestAlgorithm;

    #[test]
    fn builtin_groups_are_valid() {
        let td = DemoSet::TiberianDawn.group().unwrap();
        assert_eq!(td.dir_name, "td");
        assert_eq!(td.tasks.len(), 2);
        assert_eq!(td.tasks[0].expected_size(), 9_367_945);
        assert_eq!(td.tasks[0].digest().algorithm(), DigestAlgorithm::Md5);

        let ra = DemoSet::RedAlert.group().unwrap();
        assert_eq!(ra.dir_name, "ra");
        assert_eq!(ra.tasks.len(), 1);
        assert_eq!(ra.tasks[0].url().scheme(), "ftp");
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let err = DownloadTask::new(
            "file:///etc/passwd",
            1,
            "d41d8cd98f00b204e9800998ecf8427e",
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTask(_)));
    }

    #[test]
    fn rejects_bad_url_and_digest() {
        assert!(DownloadTask::new("not a url", 1, "d41d8cd98f00b204e9800998ecf8427e").is_err());
        assert!(DownloadTask::new("http://example.com/a.zip", 1, "nothex").is_err());
    }

    #[test]
    fn happy_path_transitions() {
        let s = TaskState::Pending
            .advance(TaskState::Downloading)
            .and_then(|s| s.advance(TaskState::Verifying))
            .and_then(|s| s.advance(TaskState::Extracting))
            .and_then(|s| s.advance(TaskState::Extracted))
            .unwrap();
        assert!(s.is_terminal());
    }

    #[test]
    fn illegal_transitions_rejected() {
        assert!(TaskState::Pending.advance(TaskState::Extracting).is_err());
        assert!(TaskState::Verifying.advance(TaskState::Downloading).is_err());
        assert!(TaskState::Extracted.advance(TaskState::Failed).is_err());
        assert!(TaskState::Failed.advance(TaskState::Pending).is_err());
        assert!(TaskState::Pending.advance(TaskState::Failed).is_err());
    }
}
