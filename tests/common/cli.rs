//! Helpers for running the `ql` binary against a throwaway workspace.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use assert_cmd::Command;
use tempfile::TempDir;

pub const TEST_ACTOR: &str = "Tester <test@example.com>";

/// A temp directory used as workspace root and as `$HOME`.
pub struct QlWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl QlWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// `ql init <project>` in the workspace root, asserting success.
    pub fn init(project: &str) -> Self {
        let workspace = Self::new();
        let run = run_ql(&workspace, ["init", project], "init");
        assert!(run.status.success(), "init failed: {}", run.stderr);
        workspace
    }

    pub fn issue_dir(&self) -> PathBuf {
        self.root.join("issues")
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// Captured output of one `ql` run.
pub struct QlRun {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl QlRun {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", self.stdout))
    }
}

/// Base command with an isolated environment.
pub fn ql_command(workspace: &QlWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("ql").expect("ql binary");
    cmd.current_dir(&workspace.root)
        .env("QUILL_ACTOR", TEST_ACTOR)
        .env("HOME", &workspace.root)
        .env("XDG_CONFIG_HOME", workspace.root.join(".config"))
        .env_remove("QUILL_ISSUE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Run `ql` with `args`. `label` names the step in failure output.
pub fn run_ql<I, S>(workspace: &QlWorkspace, args: I, label: &str) -> QlRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = ql_command(workspace)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("{label}: failed to run ql: {e}"));

    let run = QlRun {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !run.status.success() {
        eprintln!("[{label}] stderr: {}", run.stderr);
    }
    run
}

/// Run and assert success, returning stdout.
pub fn run_ok<I, S>(workspace: &QlWorkspace, args: I, label: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let run = run_ql(workspace, args, label);
    assert!(run.status.success(), "{label} failed: {}", run.stderr);
    run.stdout
}
