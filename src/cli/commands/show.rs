//! Show command implementation.

use anyhow::Result;

use crate::cli::{CommandContext, ShowArgs};
use crate::format::{IssueDetails, format_issue_details, print_json};

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or the issue is not
/// found.
pub fn execute(args: &ShowArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, tracker) = ctx.open_tracker()?;
    let issue = tracker.show(&args.key)?;

    if ctx.json {
        return print_json(&IssueDetails {
            issue: issue.clone(),
            project: tracker.project().name.clone(),
        });
    }

    print!("{}", format_issue_details(issue));
    Ok(())
}
