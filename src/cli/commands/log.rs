use anyhow::Result;

use crate::cli::{CommandContext, LogArgs};
use crate::format::{format_log_line, name_column_width, print_json};

/// Execute the log command: recent activity across all issues, newest first.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened.
pub fn execute(args: &LogArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, tracker) = ctx.open_tracker()?;
    let lines = tracker.recent_log(args.limit);

    if ctx.json {
        return print_json(&lines);
    }

    let width = name_column_width(tracker.cache().issues().iter().map(|i| i.name.as_str()));
    for line in &lines {
        println!("{}", format_log_line(line, width));
    }
    Ok(())
}
