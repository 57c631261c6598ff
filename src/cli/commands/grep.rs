use anyhow::Result;

use crate::cli::{CommandContext, GrepArgs};
use crate::format::{format_issue_line, name_column_width, print_json};

/// Execute the grep command.
///
/// # Errors
///
/// Returns an error if the pattern is not a valid regular expression.
pub fn execute(args: &GrepArgs, ctx: &CommandContext) -> Result<()> {
    let (_workspace, tracker) = ctx.open_tracker()?;
    let matches = tracker.grep(&args.pattern, args.ignore_case)?;

    if ctx.json {
        return print_json(&matches);
    }

    let width = name_column_width(tracker.cache().issues().iter().map(|i| i.name.as_str()));
    for issue in matches {
        println!("{}", format_issue_line(issue, width));
    }
    Ok(())
}
