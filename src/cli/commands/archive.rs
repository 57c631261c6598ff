use anyhow::Result;

use crate::cli::{ArchiveArgs, CommandContext};
use crate::format::print_json;

/// Execute the archive command.
///
/// # Errors
///
/// Returns an error if the release is unknown or not yet made, or the
/// target directory already exists.
pub fn execute(args: ArchiveArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;
    let report = tracker.archive_release(&args.release, args.dir)?;

    if ctx.json {
        return print_json(&report);
    }
    println!(
        "Archived {} issue(s) of release {} to {}",
        report.issues.len(),
        report.release,
        report.dir.display()
    );
    Ok(())
}
