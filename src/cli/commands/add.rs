use anyhow::Result;
use quill_lib::{IssueType, NewIssue};

use crate::cli::{AddArgs, CommandContext};

use super::report_issue;

/// Execute the add command.
///
/// # Errors
///
/// Returns an error if validation fails or the record cannot be written.
pub fn execute(args: AddArgs, ctx: &CommandContext) -> Result<()> {
    let issue_type = match args.type_.as_deref() {
        Some(t) => t.parse::<IssueType>()?,
        None => IssueType::default(),
    };

    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let issue = tracker.add_issue(NewIssue {
        title: args.title,
        description: args.description,
        issue_type,
        component: args.component,
        release: args.release,
        references: args.references,
        comment: args.comment,
    })?;

    report_issue(ctx, &issue, "Added issue")
}
