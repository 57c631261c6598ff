use anyhow::Result;

use crate::cli::{CommandContext, ComponentSubcommand};
use crate::format::print_json;

/// Execute a component subcommand.
///
/// # Errors
///
/// Returns an error if the name is invalid or already taken.
pub fn execute(command: ComponentSubcommand, ctx: &CommandContext) -> Result<()> {
    let (_workspace, mut tracker) = ctx.open_tracker()?;

    match command {
        ComponentSubcommand::Add { name } => {
            tracker.add_component(&name)?;
            if ctx.json {
                return print_json(&tracker.project().components);
            }
            println!("Added component {name}");
        }
    }
    Ok(())
}
