//! Command implementations, one module per command group.

pub mod add;
pub mod archive;
pub mod assign;
pub mod changelog;
pub mod comment;
pub mod completions;
pub mod component;
pub mod drop;
pub mod edit;
pub mod grep;
pub mod init;
pub mod log;
pub mod release;
pub mod show;
pub mod status;
pub mod todo;
pub mod version;

use quill_lib::Issue;

use crate::cli::CommandContext;
use crate::format::print_json;

/// Print the outcome of an issue action: JSON or a one-line message.
pub(crate) fn report_issue(ctx: &CommandContext, issue: &Issue, message: &str) -> anyhow::Result<()> {
    if ctx.json {
        print_json(issue)
    } else {
        println!("{message} {}: {}", issue.name, issue.title);
        Ok(())
    }
}
