//! Input and result types for tracker operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Issue, IssueType};

/// Fields for a new issue.
#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub issue_type: IssueType,
    /// Falls back to the first project component when `None`.
    pub component: Option<String>,
    pub release: Option<String>,
    pub references: Vec<String>,
    pub comment: Option<String>,
}

/// Fields to update on an issue.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub issue_type: Option<IssueType>,
    pub component: Option<String>,
}

impl IssueUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.issue_type.is_none()
            && self.component.is_none()
    }
}

/// One log entry with the issue it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub time: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub issue_name: String,
    pub issue_title: String,
}

/// Issues grouped under a release heading. `release` is `None` for the
/// unassigned group.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseGroup {
    pub release: Option<String>,
    pub issues: Vec<Issue>,
}

/// Closed issues of one type within a changelog.
#[derive(Debug, Clone, Serialize)]
pub struct ChangelogSection {
    pub issue_type: IssueType,
    pub issues: Vec<Issue>,
}
