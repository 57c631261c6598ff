use anyhow::Result;

use crate::cli::{ChangelogArgs, CommandContext};
use crate::format::print_json;

/// Execute the changelog command.
///
/// Text output:
///
/// ```text
/// == 1.0 / 2024-05-01
/// * bugfix: Crash on empty release
/// * feature: Add a changelog command
/// ```
///
/// # Errors
///
/// Returns an error if the release does not exist.
pub fn execute(args: &ChangelogArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, tracker) = ctx.open_tracker()?;
    let sections = tracker.changelog(&args.release)?;

    if ctx.json {
        return print_json(&sections);
    }

    let date = tracker
        .project()
        .release(&args.release)
        .and_then(|r| r.release_time)
        .map_or_else(|| "unreleased".to_string(), |t| t.format("%Y-%m-%d").to_string());
    println!("== {} / {date}", args.release);
    for section in &sections {
        for issue in &section.issues {
            println!("* {}: {}", section.issue_type, issue.title);
        }
    }
    Ok(())
}
