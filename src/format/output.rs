use chrono::{DateTime, Utc};
use quill_lib::{Issue, Release, ReleaseStatus};
use serde::Serialize;
use std::path::PathBuf;

/// Issue with the project it belongs to, for `show`.
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetails {
    #[serde(flatten)]
    pub issue: Issue,
    pub project: String,
}

/// Release with issue counts for the `releases` view.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseSummary {
    pub title: String,
    pub status: ReleaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_time: Option<DateTime<Utc>>,
    pub open: usize,
    pub closed: usize,
}

impl ReleaseSummary {
    #[must_use]
    pub fn new(release: &Release, open: usize, closed: usize) -> Self {
        Self {
            title: release.title.clone(),
            status: release.status,
            release_time: release.release_time,
            open,
            closed,
        }
    }
}

/// Result of `init`.
#[derive(Debug, Clone, Serialize)]
pub struct InitOutput {
    pub project: String,
    pub root: PathBuf,
    pub issue_dir: PathBuf,
}

/// Dropped issue, for `drop`.
#[derive(Debug, Clone, Serialize)]
pub struct DroppedIssue {
    pub id: String,
    pub name: String,
    pub title: String,
}
