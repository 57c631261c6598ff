//! Todo command implementation.

use anyhow::Result;
use quill_lib::{QuillError, ReleaseGroup};

use crate::cli::{CommandContext, TodoArgs};
use crate::format::{format_issue_line, name_column_width, print_json};

/// Execute the todo command.
///
/// Without a release argument, lists issues under each unreleased release
/// and then the unassigned ones.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or the named release
/// does not exist.
pub fn execute(args: &TodoArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, tracker) = ctx.open_tracker()?;

    let groups = match &args.release {
        Some(release) => {
            if tracker.project().release(release).is_none() {
                return Err(QuillError::ReleaseNotFound {
                    name: release.clone(),
                }
                .into());
            }
            vec![ReleaseGroup {
                release: Some(release.clone()),
                issues: tracker
                    .issues_by_release(Some(release.as_str()), args.all)
                    .into_iter()
                    .cloned()
                    .collect(),
            }]
        }
        None => tracker.todo(args.all),
    };

    if ctx.json {
        return print_json(&groups);
    }

    let width = name_column_width(tracker.cache().issues().iter().map(|i| i.name.as_str()));
    let mut first = true;
    for group in &groups {
        if !first {
            println!();
        }
        first = false;

        match &group.release {
            Some(release) => println!("Release {release}:"),
            None => println!("Unassigned:"),
        }
        if group.issues.is_empty() {
            println!("  (no {}issues)", if args.all { "" } else { "open " });
        }
        for issue in &group.issues {
            println!("{}", format_issue_line(issue, width));
        }
    }
    Ok(())
}
