//! Command-line interface for `quill`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use quill_lib::{Disposition, FileStore, Tracker};

use crate::config::{self, CliOverrides, Workspace};
use crate::logging;

/// `quill` (ql) - plain-text issue tracker.
#[derive(Parser, Debug)]
#[command(name = "ql")]
#[command(
    author,
    version,
    about = "Plain-text issue tracker (YAML records + release milestones)",
    long_about = None,
    after_help = "Issues live as one YAML file each; commit them with your code."
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Start workspace discovery here instead of the current directory
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Actor recorded in log entries ("Name <email>")
    #[arg(long, global = true, env = "QUILL_ACTOR")]
    pub actor: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a quill workspace
    Init(InitArgs),

    /// Add a new issue
    Add(AddArgs),

    /// Edit issue fields
    Edit(EditArgs),

    /// Start work on an issue
    Start(KeyArgs),

    /// Stop (pause) work on an issue
    Stop(KeyArgs),

    /// Close an issue
    Close(CloseArgs),

    /// Reopen a closed issue
    Reopen(KeyArgs),

    /// Comment on an issue
    Comment(CommentArgs),

    /// Assign an issue to a release
    Assign(AssignArgs),

    /// Remove an issue from its release
    Unassign(KeyArgs),

    /// Add a reference (URL, commit, ...) to an issue
    Reference(ReferenceArgs),

    /// Delete an issue for good
    Drop(DropArgs),

    /// Show issue details
    Show(ShowArgs),

    /// List open issues grouped by release
    Todo(TodoArgs),

    /// Show recent activity
    Log(LogArgs),

    /// Search issue titles and descriptions
    Grep(GrepArgs),

    /// List releases
    Releases,

    /// Manage releases
    Release(ReleaseCommand),

    /// Manage components
    Component(ComponentCommand),

    /// Move the issues of a released release into an archive directory
    Archive(ArchiveArgs),

    /// Print the changelog of a release
    Changelog(ChangelogArgs),

    /// Show version information
    Version(VersionArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name (also the first component)
    pub project: String,

    /// Issue directory, relative to the workspace root
    #[arg(long)]
    pub issue_dir: Option<String>,

    /// Your name, stored in the workspace config
    #[arg(long)]
    pub name: Option<String>,

    /// Your email, stored in the workspace config
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Issue title
    pub title: String,

    /// Description
    #[arg(short = 'd', long = "desc")]
    pub description: Option<String>,

    /// Type (bugfix, feature, task or a custom type)
    #[arg(short = 't', long = "type")]
    pub type_: Option<String>,

    /// Component (defaults to the first project component)
    #[arg(short, long)]
    pub component: Option<String>,

    /// Release to assign to
    #[arg(short, long)]
    pub release: Option<String>,

    /// Reference (repeatable)
    #[arg(long = "reference")]
    pub references: Vec<String>,

    /// Comment for the log entry
    #[arg(short = 'm', long)]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Issue identifier or name
    pub key: String,

    #[arg(long)]
    pub title: Option<String>,

    /// New description (empty clears it)
    #[arg(long = "desc")]
    pub description: Option<String>,

    #[arg(long = "type")]
    pub type_: Option<String>,

    #[arg(long)]
    pub component: Option<String>,

    /// Comment for the log entry
    #[arg(short = 'm', long)]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Issue identifier or name
    pub key: String,

    /// Comment for the log entry
    #[arg(short = 'm', long)]
    pub comment: Option<String>,
}

/// Disposition choices offered on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum DispositionArg {
    #[default]
    Fixed,
    Wontfix,
    Reorg,
}

impl From<DispositionArg> for Disposition {
    fn from(arg: DispositionArg) -> Self {
        match arg {
            DispositionArg::Fixed => Self::Fixed,
            DispositionArg::Wontfix => Self::WontFix,
            DispositionArg::Reorg => Self::Reorganized,
        }
    }
}

#[derive(Args, Debug)]
pub struct CloseArgs {
    /// Issue identifier or name
    pub key: String,

    #[arg(long, value_enum, default_value_t = DispositionArg::Fixed)]
    pub disposition: DispositionArg,

    /// Comment for the log entry
    #[arg(short = 'm', long)]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Issue identifier or name
    pub key: String,

    /// Comment text
    pub text: String,
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Issue identifier or name
    pub key: String,

    /// Release title
    pub release: String,

    /// Comment for the log entry
    #[arg(short = 'm', long)]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReferenceArgs {
    /// Issue identifier or name
    pub key: String,

    /// Reference text (URL, commit id, ...)
    pub text: String,

    /// Comment for the log entry
    #[arg(short = 'm', long)]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct DropArgs {
    /// Issue identifier or name
    pub key: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Issue identifier or name
    pub key: String,
}

#[derive(Args, Debug)]
pub struct TodoArgs {
    /// Include closed issues
    #[arg(short, long)]
    pub all: bool,

    /// Only this release
    pub release: Option<String>,
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Number of entries
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct GrepArgs {
    /// Regular expression
    pub pattern: String,

    /// Case-insensitive match
    #[arg(short, long)]
    pub ignore_case: bool,
}

#[derive(Args, Debug)]
pub struct ReleaseCommand {
    /// Release subcommand
    #[command(subcommand)]
    pub command: ReleaseSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ReleaseSubcommand {
    /// Add a release
    Add {
        name: String,
        #[arg(short = 'm', long)]
        comment: Option<String>,
    },

    /// Rename a release
    Edit {
        name: String,
        new_name: String,
        #[arg(short = 'm', long)]
        comment: Option<String>,
    },

    /// Mark a release as made
    Make {
        name: String,
        #[arg(short = 'm', long)]
        comment: Option<String>,
    },

    /// Remove a release (issues keep their assignment)
    Remove { name: String },
}

#[derive(Args, Debug)]
pub struct ComponentCommand {
    /// Component subcommand
    #[command(subcommand)]
    pub command: ComponentSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ComponentSubcommand {
    /// Add a component
    Add { name: String },
}

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Release title
    pub release: String,

    /// Target directory (default: quill-archive-<release> next to the issue dir)
    pub dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ChangelogArgs {
    /// Release title
    pub release: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Print only the version number
    #[arg(long)]
    pub short: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Shared state handed to every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub json: bool,
    pub overrides: CliOverrides,
}

impl CommandContext {
    /// Open the tracker for the current workspace.
    ///
    /// # Errors
    ///
    /// Returns an error outside a workspace or when records cannot be read.
    pub fn open_tracker(&self) -> Result<(Workspace, Tracker<FileStore>)> {
        Ok(config::open_tracker(&self.overrides)?)
    }
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let ctx = CommandContext {
        json: cli.json,
        overrides: CliOverrides {
            dir: cli.dir,
            actor: cli.actor,
        },
    };
    tracing::debug!(command = cli.command.name(), "dispatching");

    match cli.command {
        Commands::Init(args) => commands::init::execute(&args, &ctx),
        Commands::Add(args) => commands::add::execute(args, &ctx),
        Commands::Edit(args) => commands::edit::execute(args, &ctx),
        Commands::Start(args) => commands::status::start(args, &ctx),
        Commands::Stop(args) => commands::status::stop(args, &ctx),
        Commands::Close(args) => commands::status::close(args, &ctx),
        Commands::Reopen(args) => commands::status::reopen(args, &ctx),
        Commands::Comment(args) => commands::comment::comment(&args, &ctx),
        Commands::Reference(args) => commands::comment::reference(args, &ctx),
        Commands::Assign(args) => commands::assign::assign(args, &ctx),
        Commands::Unassign(args) => commands::assign::unassign(args, &ctx),
        Commands::Drop(args) => commands::drop::execute(&args, &ctx),
        Commands::Show(args) => commands::show::execute(&args, &ctx),
        Commands::Todo(args) => commands::todo::execute(&args, &ctx),
        Commands::Log(args) => commands::log::execute(&args, &ctx),
        Commands::Grep(args) => commands::grep::execute(&args, &ctx),
        Commands::Releases => commands::release::list(&ctx),
        Commands::Release(release) => commands::release::execute(release.command, &ctx),
        Commands::Component(component) => commands::component::execute(component.command, &ctx),
        Commands::Archive(args) => commands::archive::execute(args, &ctx),
        Commands::Changelog(args) => commands::changelog::execute(&args, &ctx),
        Commands::Version(args) => commands::version::execute(&args, &ctx),
        Commands::Completions(args) => {
            commands::completions::execute(&args);
            Ok(())
        }
    }
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Add(_) => "add",
            Self::Edit(_) => "edit",
            Self::Start(_) => "start",
            Self::Stop(_) => "stop",
            Self::Close(_) => "close",
            Self::Reopen(_) => "reopen",
            Self::Comment(_) => "comment",
            Self::Assign(_) => "assign",
            Self::Unassign(_) => "unassign",
            Self::Reference(_) => "reference",
            Self::Drop(_) => "drop",
            Self::Show(_) => "show",
            Self::Todo(_) => "todo",
            Self::Log(_) => "log",
            Self::Grep(_) => "grep",
            Self::Releases => "releases",
            Self::Release(release) => match release.command {
                ReleaseSubcommand::Add { .. } => "release add",
                ReleaseSubcommand::Edit { .. } => "release edit",
                ReleaseSubcommand::Make { .. } => "release make",
                ReleaseSubcommand::Remove { .. } => "release remove",
            },
            Self::Component(_) => "component add",
            Self::Archive(_) => "archive",
            Self::Changelog(_) => "changelog",
            Self::Version(_) => "version",
            Self::Completions(_) => "completions",
        }
    }
}
