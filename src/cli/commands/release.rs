//! Release listing and release actions.

use anyhow::Result;

use crate::cli::{CommandContext, ReleaseSubcommand};
use crate::format::{ReleaseSummary, format_release_line, print_json};

/// List every release in the project with open and closed counts.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened.
pub fn list(ctx: &CommandContext) -> Result<()> {
    let (_workspace, tracker) = ctx.open_tracker()?;

    let summaries: Vec<ReleaseSummary> = tracker
        .project()
        .releases
        .iter()
        .map(|release| {
            let issues = tracker.issues_by_release(Some(release.title.as_str()), true);
            let closed = issues.iter().filter(|i| i.is_closed()).count();
            ReleaseSummary::new(release, issues.len() - closed, closed)
        })
        .collect();

    if ctx.json {
        return print_json(&summaries);
    }

    if summaries.is_empty() {
        println!("No releases.");
    }
    for (release, summary) in tracker.project().releases.iter().zip(&summaries) {
        println!("{}", format_release_line(release, summary.open, summary.closed));
    }
    Ok(())
}

/// Execute a release subcommand.
///
/// # Errors
///
/// Returns an error if the release is unknown, already exists, or is in
/// the wrong state for the action.
pub fn execute(command: ReleaseSubcommand, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;

    let (release, message) = match command {
        ReleaseSubcommand::Add { name, comment } => {
            (Some(tracker.add_release(&name, comment)?), format!("Added release {name}"))
        }
        ReleaseSubcommand::Edit {
            name,
            new_name,
            comment,
        } => (
            Some(tracker.edit_release(&name, &new_name, comment)?),
            format!("Renamed release {name} to {new_name}"),
        ),
        ReleaseSubcommand::Make { name, comment } => {
            (Some(tracker.make_release(&name, comment)?), format!("Released {name}"))
        }
        ReleaseSubcommand::Remove { name } => {
            tracker.remove_release(&name)?;
            (None, format!("Removed release {name}"))
        }
    };

    if ctx.json {
        return match release {
            Some(release) => print_json(&release),
            None => print_json(&serde_json::json!({ "removed": true })),
        };
    }
    println!("{message}");
    Ok(())
}
