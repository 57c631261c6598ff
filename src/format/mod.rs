//! Output formatting for `quill`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//!
//! # JSON Output Types
//!
//! Most commands print library types directly. These wrap them where a
//! view needs more:
//! - [`IssueDetails`] - Issue with project name (show)
//! - [`ReleaseSummary`] - Release with issue counts (releases)
//! - [`InitOutput`] - Workspace paths (init)
//! - [`DroppedIssue`] - Identity of a dropped issue (drop)

mod output;
mod text;

use serde::Serialize;

pub use output::{DroppedIssue, InitOutput, IssueDetails, ReleaseSummary};
pub use text::{
    format_issue_details, format_issue_line, format_log_line, format_release_line,
    format_status_icon, format_time, format_type_badge, name_column_width, pad_to_width,
};

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{output}");
    Ok(())
}
