use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::{Cli, CompletionsArgs};

/// Write a completion script for the requested shell to stdout.
pub fn execute(args: &CompletionsArgs) {
    let mut command = Cli::command();
    generate(args.shell, &mut command, "ql", &mut std::io::stdout());
}
