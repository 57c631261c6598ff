//! Text formatting functions for `quill`.
//!
//! Provides plain text (non-ANSI) formatting for terminal output:
//! - Status icons (`_ > = x`)
//! - Type badges (`[bugfix]`, `[feature]`, ...)
//! - Issue line formatting with aligned display names
//! - Issue details and log lines

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use quill_lib::{Issue, IssueType, LogLine, Release, Status};
use unicode_width::UnicodeWidthStr;

/// Status icon characters.
pub mod icons {
    /// Not started yet.
    pub const UNSTARTED: &str = "_";
    /// Work in progress.
    pub const IN_PROGRESS: &str = ">";
    /// Work paused.
    pub const PAUSED: &str = "=";
    /// Closed.
    pub const CLOSED: &str = "x";
}

/// Return the icon character for a status.
#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::Unstarted => icons::UNSTARTED,
        Status::InProgress => icons::IN_PROGRESS,
        Status::Paused => icons::PAUSED,
        Status::Closed => icons::CLOSED,
    }
}

/// Format issue type as a bracketed badge.
#[must_use]
pub fn format_type_badge(issue_type: &IssueType) -> String {
    format!("[{}]", issue_type.as_str())
}

/// Pad `text` with spaces to `width` terminal columns.
#[must_use]
pub fn pad_to_width(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    let mut out = text.to_string();
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Widest display name in terminal columns, for aligning listings.
#[must_use]
pub fn name_column_width<'a>(names: impl IntoIterator<Item = &'a str>) -> usize {
    names
        .into_iter()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

/// Short timestamp for listings.
#[must_use]
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

/// Format a single-line issue summary.
///
/// Format: `{icon} {name padded to name_width}: {title}`
#[must_use]
pub fn format_issue_line(issue: &Issue, name_width: usize) -> String {
    format!(
        "{} {}: {}",
        format_status_icon(issue.status),
        pad_to_width(&issue.name, name_width),
        issue.title,
    )
}

/// Multi-line issue view with the full event log.
#[must_use]
pub fn format_issue_details(issue: &Issue) -> String {
    let heading = format!("Issue {}", issue.name);
    let mut out = String::new();
    let _ = writeln!(out, "{heading}");
    let _ = writeln!(out, "{}", "-".repeat(UnicodeWidthStr::width(heading.as_str())));
    let _ = writeln!(out, "      Title: {}", issue.title);
    if let Some(desc) = &issue.description {
        let _ = writeln!(out, "Description: {}", indent_continuation(desc, 13));
    }
    let _ = writeln!(out, "       Type: {}", issue.issue_type);
    let status = match &issue.disposition {
        Some(disposition) if issue.is_closed() => format!("{}: {disposition}", issue.status),
        _ => issue.status.to_string(),
    };
    let _ = writeln!(out, "     Status: {status}");
    if let Some(creator) = &issue.creator {
        let _ = writeln!(out, "    Creator: {creator}");
    }
    let _ = writeln!(out, "    Created: {}", format_time(issue.created));
    let _ = writeln!(
        out,
        "    Release: {}",
        issue.release.as_deref().unwrap_or("(unassigned)")
    );
    if let Some(component) = &issue.component {
        let _ = writeln!(out, "  Component: {component}");
    }
    if !issue.references.is_empty() {
        let _ = writeln!(out, " References:");
        for (n, reference) in issue.references.iter().enumerate() {
            let _ = writeln!(out, "             {}. {reference}", n + 1);
        }
    }
    let _ = writeln!(out, " Identifier: {}", issue.id);

    let _ = writeln!(out);
    let _ = writeln!(out, "Event log:");
    for entry in &issue.log {
        let _ = writeln!(out, "- {} ({})", format_time(entry.time), entry.actor);
        let _ = writeln!(out, "  {}", entry.action);
        if let Some(comment) = &entry.comment {
            let _ = writeln!(out, "  > {}", indent_continuation(comment, 4));
        }
    }
    out
}

fn indent_continuation(text: &str, width: usize) -> String {
    let pad = format!("\n{}", " ".repeat(width));
    text.trim_end().replace('\n', &pad)
}

/// One line of recent activity.
#[must_use]
pub fn format_log_line(line: &LogLine, name_width: usize) -> String {
    let mut out = format!(
        "{} {} {}: {} ({})",
        format_time(line.time),
        pad_to_width(&line.issue_name, name_width),
        line.issue_title,
        line.action,
        line.actor,
    );
    if let Some(comment) = &line.comment {
        let _ = write!(out, "\n  > {comment}");
    }
    out
}

/// Release summary line: title, status and issue counts.
#[must_use]
pub fn format_release_line(release: &Release, open: usize, closed: usize) -> String {
    let status = match release.release_time {
        Some(time) if release.is_released() => format!("released {}", time.format("%Y-%m-%d")),
        _ => release.status.to_string(),
    };
    format!("{} ({status}): {open} open, {closed} closed", release.title)
}
