//! Status change commands: start, stop, close, reopen.

use anyhow::Result;

use crate::cli::{CloseArgs, CommandContext, KeyArgs};

use super::report_issue;

/// # Errors
///
/// Returns an error if the issue is unknown or already in progress/closed.
pub fn start(args: KeyArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.start_work(&args.key, args.comment)?;
    report_issue(ctx, &issue, "Started work on")
}

/// # Errors
///
/// Returns an error if the issue is unknown or not in progress.
pub fn stop(args: KeyArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.stop_work(&args.key, args.comment)?;
    report_issue(ctx, &issue, "Stopped work on")
}

/// # Errors
///
/// Returns an error if the issue is unknown or already closed.
pub fn close(args: CloseArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.close_issue(&args.key, args.disposition.into(), args.comment)?;
    report_issue(ctx, &issue, "Closed")
}

/// # Errors
///
/// Returns an error if the issue is unknown or not closed.
pub fn reopen(args: KeyArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.reopen_issue(&args.key, args.comment)?;
    report_issue(ctx, &issue, "Reopened")
}
