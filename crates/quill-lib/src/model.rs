//! Core data types for quill.
//!
//! These are the in-memory shapes. The on-disk shapes live in
//! [`crate::record`]; the two are converted field by field there.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::QuillError;

/// Display name every cached release carries.
pub const RELEASE_DISPLAY_NAME: &str = "Release";

/// Name prefix used by the rename pass when an issue has no component.
pub const DEFAULT_NAME_PREFIX: &str = "issue";

/// Current time at the precision records store (microseconds).
#[must_use]
pub fn stamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Issue lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Unstarted,
    InProgress,
    Paused,
    Closed,
}

impl Status {
    /// In-memory spelling. Words are separated by a space.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::InProgress => "in progress",
            Self::Paused => "paused",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = QuillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unstarted" => Ok(Self::Unstarted),
            "in progress" | "in_progress" | "inprogress" => Ok(Self::InProgress),
            "paused" => Ok(Self::Paused),
            "closed" => Ok(Self::Closed),
            other => Err(QuillError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Issue type category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum IssueType {
    Bugfix,
    Feature,
    #[default]
    Task,
    Custom(String),
}

impl IssueType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bugfix => "bugfix",
            Self::Feature => "feature",
            Self::Task => "task",
            Self::Custom(value) => value,
        }
    }

    #[must_use]
    pub const fn is_standard(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Type as spelled in a record. Only the exact standard names map to
    /// their variants; anything else is kept verbatim.
    #[must_use]
    pub fn from_record_value(raw: &str) -> Self {
        match raw {
            "bugfix" => Self::Bugfix,
            "feature" => Self::Feature,
            "task" => Self::Task,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = QuillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bugfix" | "bug" => Ok(Self::Bugfix),
            "feature" => Ok(Self::Feature),
            "task" => Ok(Self::Task),
            other => Ok(Self::Custom(other.to_string())),
        }
    }
}

impl Serialize for IssueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// How a closed issue was resolved.
///
/// Stored on the issue as free text; these are the values the CLI offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Fixed,
    WontFix,
    Reorganized,
}

impl Disposition {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::WontFix => "won't fix",
            Self::Reorganized => "reorganized",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release lifecycle status. `Unreleased -> Released` is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReleaseStatus {
    #[default]
    Unreleased,
    Released,
}

impl ReleaseStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unreleased => "unreleased",
            Self::Released => "released",
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseStatus {
    type Err = QuillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unreleased" => Ok(Self::Unreleased),
            "released" => Ok(Self::Released),
            other => Err(QuillError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

impl Serialize for ReleaseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One line of an item's change log.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LogEntry {
    pub time: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl LogEntry {
    #[must_use]
    pub fn new(
        time: DateTime<Utc>,
        actor: impl Into<String>,
        action: impl Into<String>,
        comment: Option<String>,
    ) -> Self {
        Self {
            time,
            actor: actor.into(),
            action: action.into(),
            comment: comment.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// A tracked work item.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Issue {
    /// Stable identifier (40 hex chars).
    pub id: String,

    /// Display name, e.g. `quill-3`. Reassigned by the cache rename pass.
    pub name: String,

    pub title: String,

    #[serde(rename = "type")]
    pub issue_type: IssueType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    pub status: Status,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    pub created: DateTime<Utc>,

    /// Release title, `None` when unassigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,

    pub log: Vec<LogEntry>,
}

impl Default for Issue {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            title: String::new(),
            issue_type: IssueType::default(),
            component: None,
            status: Status::default(),
            disposition: None,
            description: None,
            creator: None,
            created: stamp_now(),
            release: None,
            references: Vec::new(),
            log: Vec::new(),
        }
    }
}

impl Issue {
    /// Whether the issue may enter the item cache.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.id.trim().is_empty()
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    /// Append a log entry stamped `now`.
    pub fn log_event(&mut self, actor: &str, action: impl Into<String>, comment: Option<String>) {
        self.log.push(LogEntry::new(stamp_now(), actor, action, comment));
    }
}

/// A named milestone.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Release {
    pub title: String,
    pub status: ReleaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_time: Option<DateTime<Utc>>,
    pub log: Vec<LogEntry>,
}

impl Release {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: ReleaseStatus::Unreleased,
            release_time: None,
            log: Vec::new(),
        }
    }

    /// Constant display name; releases are keyed by title.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        RELEASE_DISPLAY_NAME
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.status == ReleaseStatus::Released
    }

    pub fn log_event(&mut self, actor: &str, action: impl Into<String>, comment: Option<String>) {
        self.log.push(LogEntry::new(stamp_now(), actor, action, comment));
    }
}

/// A project component. Issue display names are prefixed with it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Component {
    pub name: String,
}

/// Project-wide record: name, components and every release.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct Project {
    pub name: String,
    pub components: Vec<Component>,
    pub releases: Vec<Release>,
}

impl Project {
    /// New project whose first component carries the project name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            components: vec![Component { name: name.clone() }],
            name,
            releases: Vec::new(),
        }
    }

    #[must_use]
    pub fn release(&self, title: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.title == title)
    }

    pub fn release_mut(&mut self, title: &str) -> Option<&mut Release> {
        self.releases.iter_mut().find(|r| r.title == title)
    }

    /// Releases that have not been made yet, in project order.
    pub fn unreleased(&self) -> impl Iterator<Item = &Release> {
        self.releases.iter().filter(|r| !r.is_released())
    }

    #[must_use]
    pub fn has_component(&self, name: &str) -> bool {
        self.components.iter().any(|c| c.name == name)
    }

    /// Component new issues fall back to.
    #[must_use]
    pub fn default_component(&self) -> Option<&str> {
        self.components.first().map(|c| c.name.as_str())
    }
}
