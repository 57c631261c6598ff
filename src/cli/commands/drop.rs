use anyhow::Result;

use crate::cli::{CommandContext, DropArgs};
use crate::format::{DroppedIssue, print_json};

/// Execute the drop command.
///
/// # Errors
///
/// Returns an error if the issue is unknown or its record cannot be removed.
pub fn execute(args: &DropArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.drop_issue(&args.key)?;

    if ctx.json {
        return print_json(&DroppedIssue {
            id: issue.id,
            name: issue.name,
            title: issue.title,
        });
    }
    println!("Dropped {}: {}", issue.name, issue.title);
    Ok(())
}
