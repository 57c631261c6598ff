//! Configuration management for `quill`.
//!
//! Configuration is loaded from YAML files with support for:
//! - Workspace config (`.quill.yaml` at the workspace root)
//! - User config (`~/.config/quill/config.yaml`)
//! - Environment variable overrides (`QUILL_ACTOR`, `QUILL_ISSUE_DIR`)
//!
//! The workspace root is the nearest directory, walking up from the
//! starting point, that holds a `.quill.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use quill_lib::error::{QuillError, Result};
use quill_lib::{FileStore, Tracker};
use serde::{Deserialize, Serialize};

/// Workspace config file name.
pub const WORKSPACE_FILE: &str = ".quill.yaml";

/// Issue directory used when the workspace config names none.
pub const DEFAULT_ISSUE_DIR: &str = "issues";

/// Environment variable overriding the issue directory.
pub const ISSUE_DIR_ENV: &str = "QUILL_ISSUE_DIR";

/// `.quill.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default = "default_issue_dir")]
    pub issue_dir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: None,
            email: None,
            issue_dir: default_issue_dir(),
        }
    }
}

fn default_issue_dir() -> String {
    DEFAULT_ISSUE_DIR.to_string()
}

/// `~/.config/quill/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Values taken from global CLI flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Where workspace discovery starts instead of the current directory.
    pub dir: Option<PathBuf>,
    /// `--actor` or `QUILL_ACTOR`.
    pub actor: Option<String>,
}

/// A discovered workspace.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: WorkspaceConfig,
}

impl Workspace {
    /// Issue directory, honoring an explicit override.
    #[must_use]
    pub fn issue_dir_with(&self, override_dir: Option<&str>) -> PathBuf {
        let dir = override_dir
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.config.issue_dir);
        self.root.join(dir)
    }

    /// Issue directory, honoring `QUILL_ISSUE_DIR`.
    #[must_use]
    pub fn issue_dir(&self) -> PathBuf {
        let env_dir = std::env::var(ISSUE_DIR_ENV).ok();
        self.issue_dir_with(env_dir.as_deref())
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Walk up from `start` to the first directory holding `.quill.yaml`.
///
/// # Errors
///
/// Returns `Io` if `start` cannot be canonicalized.
pub fn discover_root(start: &Path) -> Result<Option<PathBuf>> {
    let start = dunce::canonicalize(start)?;
    Ok(start
        .ancestors()
        .find(|dir| dir.join(WORKSPACE_FILE).is_file())
        .map(Path::to_path_buf))
}

/// Read `.quill.yaml` from a workspace root.
///
/// # Errors
///
/// Returns `Config` when the file cannot be parsed.
pub fn load_workspace_config(root: &Path) -> Result<WorkspaceConfig> {
    let path = root.join(WORKSPACE_FILE);
    let text = fs::read_to_string(&path)?;
    if text.trim().is_empty() {
        return Ok(WorkspaceConfig::default());
    }
    serde_yaml::from_str(&text)
        .map_err(|e| QuillError::Config(format!("{}: {e}", path.display())))
}

/// Write `.quill.yaml` into `root`.
///
/// # Errors
///
/// Returns `Yaml` or `Io` on failure.
pub fn write_workspace_config(root: &Path, config: &WorkspaceConfig) -> Result<PathBuf> {
    let path = root.join(WORKSPACE_FILE);
    let text = serde_yaml::to_string(config)?;
    fs::write(&path, text)?;
    Ok(path)
}

/// Locate and load the workspace.
///
/// # Errors
///
/// Returns `NotInitialized` when no `.quill.yaml` is found.
pub fn load_workspace(overrides: &CliOverrides) -> Result<Workspace> {
    let start = match &overrides.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let root = discover_root(&start)?.ok_or(QuillError::NotInitialized)?;
    let config = load_workspace_config(&root)?;
    tracing::debug!(root = %root.display(), "found workspace");
    Ok(Workspace { root, config })
}

// ============================================================================
// User config
// ============================================================================

/// `$XDG_CONFIG_HOME/quill/config.yaml`, else `~/.config/quill/config.yaml`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg).join("quill").join("config.yaml"));
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".config").join("quill").join("config.yaml"))
}

/// Load the user config. A missing file is an empty config; a broken one
/// is logged and ignored.
#[must_use]
pub fn load_user_config() -> UserConfig {
    let Some(path) = user_config_path() else {
        return UserConfig::default();
    };
    let Ok(text) = fs::read_to_string(&path) else {
        return UserConfig::default();
    };
    match serde_yaml::from_str::<Option<UserConfig>>(&text) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable user config");
            UserConfig::default()
        }
    }
}

// ============================================================================
// Actor
// ============================================================================

/// `Name <email>`, or just `Name`.
#[must_use]
pub fn format_actor(name: &str, email: Option<&str>) -> String {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(email) => format!("{} <{email}>", name.trim()),
        None => name.trim().to_string(),
    }
}

/// Pick the actor string.
///
/// Precedence: explicit value (flag or `QUILL_ACTOR`), workspace config,
/// user config, login name.
#[must_use]
pub fn resolve_actor(
    explicit: Option<&str>,
    workspace: &WorkspaceConfig,
    user: &UserConfig,
    login: Option<&str>,
) -> String {
    if let Some(actor) = explicit.map(str::trim).filter(|a| !a.is_empty()) {
        return actor.to_string();
    }

    let email = workspace.email.as_deref().or(user.email.as_deref());
    let name = workspace
        .name
        .as_deref()
        .or(user.name.as_deref())
        .or(login)
        .filter(|n| !n.trim().is_empty());

    match name {
        Some(name) => format_actor(name, email),
        None => "unknown".to_string(),
    }
}

/// Open the tracker for the discovered workspace.
///
/// # Errors
///
/// Returns `NotInitialized` outside a workspace, or any error raised while
/// loading records.
pub fn open_tracker(overrides: &CliOverrides) -> Result<(Workspace, Tracker<FileStore>)> {
    let workspace = load_workspace(overrides)?;
    let login = std::env::var("USER").ok();
    let actor = resolve_actor(
        overrides.actor.as_deref(),
        &workspace.config,
        &load_user_config(),
        login.as_deref(),
    );
    let store = FileStore::new(workspace.issue_dir());
    tracing::debug!(dir = %store.dir().display(), %actor, "opening tracker");
    let tracker = Tracker::open(store, actor)?;
    Ok((workspace, tracker))
}
