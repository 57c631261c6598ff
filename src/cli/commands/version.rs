//! Version command implementation.

use anyhow::Result;
use serde::Serialize;

use crate::cli::{CommandContext, VersionArgs};
use crate::format::print_json;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: &VersionArgs, ctx: &CommandContext) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    // Handle --short flag: output only version number
    if args.short {
        println!("{version}");
        return Ok(());
    }

    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    if ctx.json {
        return print_json(&VersionOutput { version, build });
    }

    println!("ql version {version} ({build})");
    Ok(())
}
