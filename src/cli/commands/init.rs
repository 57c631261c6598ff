//! Init command implementation.

use std::fs;

use anyhow::Result;
use quill_lib::{FileStore, QuillError};

use crate::cli::{CommandContext, InitArgs};
use crate::config::{self, WORKSPACE_FILE, WorkspaceConfig};
use crate::format::{InitOutput, print_json};

/// Execute the init command.
///
/// Writes `.quill.yaml` into the target directory (`--dir` or the current
/// directory) and creates the issue directory with its project record.
///
/// # Errors
///
/// Returns an error if a workspace already exists there or the files
/// cannot be written.
pub fn execute(args: &InitArgs, ctx: &CommandContext) -> Result<()> {
    let root = match &ctx.overrides.dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dunce::canonicalize(dir)?
        }
        None => dunce::canonicalize(std::env::current_dir()?)?,
    };

    let config_path = root.join(WORKSPACE_FILE);
    if config_path.exists() {
        return Err(QuillError::AlreadyInitialized { path: config_path }.into());
    }

    let workspace_config = WorkspaceConfig {
        name: args.name.clone(),
        email: args.email.clone(),
        issue_dir: args
            .issue_dir
            .clone()
            .unwrap_or_else(|| config::DEFAULT_ISSUE_DIR.to_string()),
    };

    let issue_dir = root.join(&workspace_config.issue_dir);
    FileStore::init(&issue_dir, &args.project)?;
    config::write_workspace_config(&root, &workspace_config)?;
    tracing::info!(root = %root.display(), project = %args.project, "initialized workspace");

    if ctx.json {
        return print_json(&InitOutput {
            project: args.project.clone(),
            root,
            issue_dir,
        });
    }

    println!(
        "Initialized quill project '{}' in {}",
        args.project,
        issue_dir.display()
    );
    Ok(())
}
