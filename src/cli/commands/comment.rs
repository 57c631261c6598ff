use anyhow::Result;

use crate::cli::{CommandContext, CommentArgs, ReferenceArgs};

use super::report_issue;

/// Execute the comment command.
///
/// # Errors
///
/// Returns an error if the comment is blank or the issue is unknown.
pub fn comment(args: &CommentArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.comment_issue(&args.key, &args.text)?;
    report_issue(ctx, &issue, "Commented on")
}

/// Execute the reference command.
///
/// # Errors
///
/// Returns an error if the reference is blank or the issue is unknown.
pub fn reference(args: ReferenceArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.add_reference(&args.key, &args.text, args.comment)?;
    report_issue(ctx, &issue, "Added reference to")
}
