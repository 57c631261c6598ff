use anyhow::Result;

use crate::cli::{AssignArgs, CommandContext, KeyArgs};
use crate::format::print_json;

use super::report_issue;

/// # Errors
///
/// Returns an error if the issue or release is unknown, the release has
/// been made, or the issue is already assigned to it.
pub fn assign(args: AssignArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.assign_issue(&args.key, Some(args.release.as_str()), args.comment)?;

    if ctx.json {
        return print_json(&issue);
    }
    println!(
        "Assigned {}: {} to release {}",
        issue.name, issue.title, args.release
    );
    Ok(())
}

/// # Errors
///
/// Returns an error if the issue is unknown or not assigned.
pub fn unassign(args: KeyArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.assign_issue(&args.key, None, args.comment)?;
    report_issue(ctx, &issue, "Unassigned")
}
