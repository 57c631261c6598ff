//! On-disk record mapping.
//!
//! Each issue is one YAML document; the project (components and releases)
//! is another. Enumerated fields are written with a leading marker
//! character (`:in_progress`, `:bugfix`) so they can be told apart from
//! free text. The mapping is explicit in both directions: every field that
//! changes shape on the way to disk is listed in [`issue_to_record`] and
//! undone in [`issue_from_record`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::model::{Component, Issue, IssueType, LogEntry, Project, Release, ReleaseStatus, Status};

/// Prefix marking an enumerated value in a record.
pub const MARKER: char = ':';

const ISSUE_TAG: &str = "!quill,2024-01-01/issue";
const PROJECT_TAG: &str = "!quill,2024-01-01/project";

/// Matches `!authority,YYYY-MM-DD/kind` tags after a document start,
/// a sequence dash or a mapping key at the start of a line.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(^---|^[ \t]*-|^[ \t]*(?:-[ \t]+)?[\w\-]+:)[ \t]+![\w.\-]+,\d{4}-\d{2}-\d{2}/[\w\-]+",
    )
    .expect("tag pattern is valid")
});

// ============================================================================
// Timestamps
// ============================================================================

/// Timestamp as stored in a record.
///
/// Written as `YYYY-MM-DD HH:MM:SS.ffffff Z`. Read from any of the
/// zone-aware or naive forms accepted by [`parse_timestamp`], always
/// normalized to UTC so mixed inputs compare correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordTime(pub DateTime<Utc>);

impl Serialize for RecordTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(self.0))
    }
}

impl<'de> Deserialize<'de> for RecordTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .map(RecordTime)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{raw}'")))
    }
}

/// Format a timestamp the way records store it.
#[must_use]
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S%.6f Z").to_string()
}

/// Parse a record timestamp, normalizing to UTC.
///
/// Naive values (no zone) are taken to be UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f %:z", "%Y-%m-%d %H:%M:%S%.f %z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix("UTC"))
        .map_or(raw, str::trim_end);
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// ============================================================================
// Marker encoding
// ============================================================================

/// Prefix `value` with the marker unless it already has one.
#[must_use]
pub fn encode_marker(value: &str) -> String {
    if value.starts_with(MARKER) {
        value.to_string()
    } else {
        format!("{MARKER}{value}")
    }
}

/// Strip the marker if present.
#[must_use]
pub fn decode_marker(value: &str) -> &str {
    value.strip_prefix(MARKER).unwrap_or(value)
}

/// `in progress` -> `:in_progress`.
#[must_use]
pub fn encode_status(status: Status) -> String {
    encode_marker(&status.as_str().replace(' ', "_"))
}

/// `:in_progress` -> `in progress`.
///
/// # Errors
///
/// Returns `InvalidStatus` for values outside the known set.
pub fn decode_status(value: &str) -> Result<Status> {
    decode_marker(value).replace('_', " ").parse()
}

// ============================================================================
// Record shapes
// ============================================================================

/// `[time, actor, action, comment]` as stored under `log_events`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord(
    pub RecordTime,
    pub String,
    pub String,
    pub Option<String>,
);

/// Issue exactly as it appears on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueRecord {
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: String,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub disposition: String,
    pub creation_time: RecordTime,
    #[serde(default)]
    pub references: Vec<String>,
    pub id: String,
    #[serde(default)]
    pub log_events: Vec<LogRecord>,
}

/// Release entry inside the project record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub release_time: Option<RecordTime>,
    #[serde(default)]
    pub log_events: Vec<LogRecord>,
}

/// Component entry inside the project record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentRecord {
    pub name: String,
}

/// The project record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRecord {
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
    #[serde(default)]
    pub releases: Vec<ReleaseRecord>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============================================================================
// Field mapping
// ============================================================================

fn log_to_record(entry: &LogEntry) -> LogRecord {
    LogRecord(
        RecordTime(entry.time),
        entry.actor.clone(),
        entry.action.clone(),
        Some(entry.comment.clone().unwrap_or_default()),
    )
}

fn log_from_record(record: LogRecord) -> LogEntry {
    let LogRecord(time, actor, action, comment) = record;
    LogEntry {
        time: time.0,
        actor,
        action,
        comment: non_empty(comment),
    }
}

/// Map an in-memory issue to its record.
#[must_use]
pub fn issue_to_record(issue: &Issue) -> IssueRecord {
    IssueRecord {
        title: issue.title.clone(),
        desc: issue.description.clone(),
        issue_type: encode_marker(issue.issue_type.as_str()),
        component: issue.component.clone(),
        release: issue.release.clone(),
        reporter: issue.creator.clone(),
        status: encode_status(issue.status),
        disposition: issue.disposition.clone().unwrap_or_default(),
        creation_time: RecordTime(issue.created),
        references: issue.references.clone(),
        id: issue.id.clone(),
        log_events: issue.log.iter().map(log_to_record).collect(),
    }
}

/// Map a record back to an issue. The display name starts out as the id;
/// the cache rename pass assigns the real one.
///
/// # Errors
///
/// Returns `InvalidStatus` when the status is outside the known set.
pub fn issue_from_record(record: IssueRecord) -> Result<Issue> {
    let status = decode_status(&record.status)?;
    let issue_type = IssueType::from_record_value(decode_marker(&record.issue_type));

    Ok(Issue {
        name: record.id.clone(),
        id: record.id,
        title: record.title,
        issue_type,
        component: non_empty(record.component),
        status,
        disposition: non_empty(Some(record.disposition)),
        description: record.desc,
        creator: record.reporter,
        created: record.creation_time.0,
        release: non_empty(record.release),
        references: record.references,
        log: record.log_events.into_iter().map(log_from_record).collect(),
    })
}

/// Map a release to its record.
#[must_use]
pub fn release_to_record(release: &Release) -> ReleaseRecord {
    ReleaseRecord {
        name: release.title.clone(),
        status: encode_marker(release.status.as_str()),
        release_time: release.release_time.map(RecordTime),
        log_events: release.log.iter().map(log_to_record).collect(),
    }
}

/// Map a release record back.
///
/// # Errors
///
/// Returns `InvalidStatus` for an unknown release status.
pub fn release_from_record(record: ReleaseRecord) -> Result<Release> {
    let status: ReleaseStatus = decode_marker(&record.status).parse()?;
    Ok(Release {
        title: record.name,
        status,
        release_time: record.release_time.map(|t| t.0),
        log: record.log_events.into_iter().map(log_from_record).collect(),
    })
}

#[must_use]
pub fn project_to_record(project: &Project) -> ProjectRecord {
    ProjectRecord {
        name: project.name.clone(),
        components: project
            .components
            .iter()
            .map(|c| ComponentRecord {
                name: c.name.clone(),
            })
            .collect(),
        releases: project.releases.iter().map(release_to_record).collect(),
    }
}

/// # Errors
///
/// Returns `InvalidStatus` if any release carries an unknown status.
pub fn project_from_record(record: ProjectRecord) -> Result<Project> {
    let releases = record
        .releases
        .into_iter()
        .map(release_from_record)
        .collect::<Result<Vec<_>>>()?;
    Ok(Project {
        name: record.name,
        components: record
            .components
            .into_iter()
            .map(|c| Component { name: c.name })
            .collect(),
        releases,
    })
}

// ============================================================================
// Text encoding
// ============================================================================

/// Remove type tags so the document parses as plain YAML.
#[must_use]
pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "$1").into_owned()
}

fn with_tag(tag: &str, yaml: &str) -> String {
    let body = yaml.strip_prefix("---\n").unwrap_or(yaml);
    format!("--- {tag}\n{body}")
}

/// Serialize an issue to record text.
///
/// # Errors
///
/// Returns `Yaml` if serialization fails.
pub fn encode_issue(issue: &Issue) -> Result<String> {
    let yaml = serde_yaml::to_string(&issue_to_record(issue))?;
    Ok(with_tag(ISSUE_TAG, &yaml))
}

/// Parse record text into an issue. All or nothing.
///
/// # Errors
///
/// Returns `Yaml` for malformed documents and `InvalidStatus` for unknown
/// status values.
pub fn decode_issue(text: &str) -> Result<Issue> {
    let record: IssueRecord = serde_yaml::from_str(&strip_tags(text))?;
    issue_from_record(record)
}

/// Serialize the project to record text.
///
/// # Errors
///
/// Returns `Yaml` if serialization fails.
pub fn encode_project(project: &Project) -> Result<String> {
    let yaml = serde_yaml::to_string(&project_to_record(project))?;
    Ok(with_tag(PROJECT_TAG, &yaml))
}

/// Parse project record text.
///
/// # Errors
///
/// Returns `Yaml` for malformed documents and `InvalidStatus` for unknown
/// release status values.
pub fn decode_project(text: &str) -> Result<Project> {
    let record: ProjectRecord = serde_yaml::from_str(&strip_tags(text))?;
    project_from_record(record)
}
