use anyhow::Result;
use quill_lib::{IssueType, IssueUpdate};

use crate::cli::{CommandContext, EditArgs};

use super::report_issue;

/// Execute the edit command. An empty `--desc` clears the description.
///
/// # Errors
///
/// Returns an error if nothing is given to change or the issue is unknown.
pub fn execute(args: EditArgs, ctx: &CommandContext) -> Result<()> {
    let issue_type = args
        .type_
        .as_deref()
        .map(str::parse::<IssueType>)
        .transpose()?;

    let update = IssueUpdate {
        title: args.title,
        description: args
            .description
            .map(|d| if d.trim().is_empty() { None } else { Some(d) }),
        issue_type,
        component: args.component,
    };

    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.edit_issue(&args.key, &update, args.comment)?;
    report_issue(ctx, &issue, "Edited")
}
