mod common;
use common::cli::{QlWorkspace, TEST_ACTOR, run_ok, run_ql};

use predicates::prelude::*;

#[test]
fn test_init_creates_workspace() {
    let workspace = QlWorkspace::new();
    let stdout = run_ok(&workspace, ["init", "demo"], "init");

    assert!(stdout.contains("Initialized quill project 'demo'"));
    assert!(workspace.root.join(".quill.yaml").is_file());
    assert!(workspace.issue_dir().join("project.yaml").is_file());

    let again = run_ql(&workspace, ["init", "demo"], "init_again");
    assert!(!again.status.success());
    assert!(again.stderr.contains("Already initialized"));
}

#[test]
fn test_commands_outside_workspace_fail() {
    let workspace = QlWorkspace::new();
    let run = run_ql(&workspace, ["todo"], "todo");
    assert!(!run.status.success());
    assert!(run.stderr.contains("Not a quill workspace"));
}

#[test]
fn test_add_and_show() {
    let workspace = QlWorkspace::init("demo");
    let stdout = run_ok(
        &workspace,
        ["add", "Crash on startup", "-t", "bug", "-d", "Segfault in main"],
        "add",
    );
    assert!(stdout.contains("Added issue demo-1: Crash on startup"));

    let show = run_ok(&workspace, ["show", "demo-1"], "show");
    assert!(show.contains("Issue demo-1"));
    assert!(show.contains("Type: bugfix"));
    assert!(show.contains("Description: Segfault in main"));
    assert!(show.contains(&format!("Creator: {TEST_ACTOR}")));
    assert!(show.contains("created"));

    let record_count = std::fs::read_dir(workspace.issue_dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("issue-"))
        .count();
    assert_eq!(record_count, 1);
}

#[test]
fn test_status_workflow() {
    let workspace = QlWorkspace::init("demo");
    run_ok(&workspace, ["add", "Do the thing"], "add");

    run_ok(&workspace, ["start", "demo-1"], "start");
    let again = run_ql(&workspace, ["start", "demo-1"], "start_again");
    assert!(!again.status.success());
    assert!(again.stderr.contains("issue is in progress"));

    run_ok(&workspace, ["stop", "demo-1", "-m", "blocked on review"], "stop");
    let todo = run_ok(&workspace, ["todo"], "todo_paused");
    assert!(todo.contains("= demo-1: Do the thing"));

    run_ok(&workspace, ["close", "demo-1", "--disposition", "wontfix"], "close");
    let todo = run_ok(&workspace, ["todo"], "todo_closed");
    assert!(!todo.contains("Do the thing"));
    let todo_all = run_ok(&workspace, ["todo", "--all"], "todo_all");
    assert!(todo_all.contains("x demo-1: Do the thing"));

    let show = run_ok(&workspace, ["show", "demo-1"], "show");
    assert!(show.contains("closed with disposition won't fix"));
    assert!(show.contains("> blocked on review"));

    run_ok(&workspace, ["reopen", "demo-1"], "reopen");
    let todo = run_ok(&workspace, ["todo"], "todo_reopened");
    assert!(todo.contains("_ demo-1: Do the thing"));
}

#[test]
fn test_releases_and_assignment() {
    let workspace = QlWorkspace::init("demo");
    run_ok(&workspace, ["release", "add", "1.0"], "release_add");
    run_ok(&workspace, ["add", "Planned work"], "add_planned");
    run_ok(&workspace, ["add", "Loose end"], "add_loose");

    let assigned = run_ok(&workspace, ["assign", "demo-1", "1.0"], "assign");
    assert!(assigned.contains("to release 1.0"));

    let todo = run_ok(&workspace, ["todo"], "todo");
    let release_pos = todo.find("Release 1.0:").unwrap();
    let unassigned_pos = todo.find("Unassigned:").unwrap();
    let planned_pos = todo.find("Planned work").unwrap();
    let loose_pos = todo.find("Loose end").unwrap();
    assert!(release_pos < planned_pos && planned_pos < unassigned_pos);
    assert!(unassigned_pos < loose_pos);

    let releases = run_ok(&workspace, ["releases"], "releases");
    assert!(releases.contains("1.0 (unreleased): 1 open, 0 closed"));

    run_ok(&workspace, ["release", "edit", "1.0", "1.1"], "release_edit");
    let show = run_ok(&workspace, ["show", "demo-1"], "show");
    assert!(show.contains("Release: 1.1"));
    assert!(show.contains("assigned to release 1.1 from 1.0"));

    run_ok(&workspace, ["unassign", "demo-1"], "unassign");
    let show = run_ok(&workspace, ["show", "demo-1"], "show_unassigned");
    assert!(show.contains("Release: (unassigned)"));

    let missing = run_ql(&workspace, ["assign", "demo-1", "9.9"], "assign_missing");
    assert!(!missing.status.success());
    assert!(missing.stderr.contains("Release not found: 9.9"));
}

#[test]
fn test_make_release_and_changelog() {
    let workspace = QlWorkspace::init("demo");
    run_ok(&workspace, ["release", "add", "1.0"], "release_add");
    run_ok(&workspace, ["add", "Fix crash", "-t", "bugfix", "-r", "1.0"], "add_bug");
    run_ok(&workspace, ["add", "New flag", "-t", "feature", "-r", "1.0"], "add_feature");
    run_ok(&workspace, ["close", "demo-1"], "close_bug");
    run_ok(&workspace, ["close", "demo-2"], "close_feature");
    run_ok(&workspace, ["release", "make", "1.0"], "release_make");

    let changelog = run_ok(&workspace, ["changelog", "1.0"], "changelog");
    assert!(changelog.starts_with("== 1.0 / "));
    let bug_pos = changelog.find("* bugfix: Fix crash").unwrap();
    let feature_pos = changelog.find("* feature: New flag").unwrap();
    assert!(bug_pos < feature_pos);

    let again = run_ql(&workspace, ["release", "make", "1.0"], "release_make_again");
    assert!(!again.status.success());
    assert!(again.stderr.contains("already released"));

    let assign = run_ql(&workspace, ["add", "Too late", "-r", "1.0"], "add_to_released");
    assert!(!assign.status.success());
}

#[test]
fn test_archive_release() {
    let workspace = QlWorkspace::init("demo");
    run_ok(&workspace, ["release", "add", "1.0"], "release_add");
    run_ok(&workspace, ["add", "Shipped", "-r", "1.0"], "add_shipped");
    run_ok(&workspace, ["add", "Not yet"], "add_other");
    run_ok(&workspace, ["close", "demo-1"], "close");

    let early = run_ql(&workspace, ["archive", "1.0"], "archive_early");
    assert!(!early.status.success());

    run_ok(&workspace, ["release", "make", "1.0"], "release_make");
    let stdout = run_ok(&workspace, ["archive", "1.0"], "archive");
    assert!(stdout.contains("Archived 1 issue(s) of release 1.0"));

    let archive_dir = workspace.root.join("quill-archive-1.0");
    assert!(archive_dir.join("project.yaml").is_file());

    let todo = run_ok(&workspace, ["todo", "--all"], "todo");
    assert!(!todo.contains("Shipped"));
    assert!(todo.contains("demo-1: Not yet"));

    let again = run_ql(&workspace, ["archive", "1.0"], "archive_again");
    assert!(!again.status.success());
    assert!(again.stderr.contains("Archive directory already exists"));
}

#[test]
fn test_edit_comment_reference_and_drop() {
    let workspace = QlWorkspace::init("demo");
    run_ok(&workspace, ["component", "add", "ui"], "component_add");
    run_ok(&workspace, ["add", "Button misaligned"], "add");

    let nothing = run_ql(&workspace, ["edit", "demo-1"], "edit_nothing");
    assert!(!nothing.status.success());
    assert!(nothing.stderr.contains("Nothing to do"));

    let edited = run_ok(
        &workspace,
        ["edit", "demo-1", "--component", "ui", "--title", "Button off by 2px"],
        "edit",
    );
    assert!(edited.contains("ui-1: Button off by 2px"));

    run_ok(&workspace, ["comment", "ui-1", "Seen on Firefox too"], "comment");
    run_ok(&workspace, ["reference", "ui-1", "https://example.com/42"], "reference");

    let show = run_ok(&workspace, ["show", "ui-1"], "show");
    assert!(show.contains("> Seen on Firefox too"));
    assert!(show.contains("1. https://example.com/42"));
    assert!(show.contains("added reference 1"));

    let dropped = run_ok(&workspace, ["drop", "ui-1"], "drop");
    assert!(dropped.contains("Dropped ui-1"));
    let missing = run_ql(&workspace, ["show", "ui-1"], "show_dropped");
    assert!(!missing.status.success());
    assert!(missing.stderr.contains("Issue not found: ui-1"));
}

#[test]
fn test_grep_and_log() {
    let workspace = QlWorkspace::init("demo");
    run_ok(&workspace, ["add", "Parser panics on tabs"], "add_parser");
    run_ok(&workspace, ["add", "Docs", "-d", "explain the PARSER flags"], "add_docs");
    run_ok(&workspace, ["start", "demo-1"], "start");

    let grep = run_ok(&workspace, ["grep", "Parser"], "grep");
    assert!(grep.contains("Parser panics on tabs"));
    assert!(!grep.contains("Docs"));

    let grep_i = run_ok(&workspace, ["grep", "-i", "parser"], "grep_i");
    assert!(grep_i.contains("Docs"));

    let bad = run_ql(&workspace, ["grep", "("], "grep_bad");
    assert!(!bad.status.success());

    let log = run_ok(&workspace, ["log", "-n", "2"], "log");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("started work"));
    assert!(lines[1].contains("created"));
}

#[test]
fn test_json_output() {
    let workspace = QlWorkspace::init("demo");
    let added = run_ql(&workspace, ["--json", "add", "JSON issue", "-t", "feature"], "add_json");
    assert!(added.status.success());
    let issue = added.json();
    assert_eq!(issue["name"], "demo-1");
    assert_eq!(issue["type"], "feature");
    assert_eq!(issue["status"], "unstarted");
    assert_eq!(issue["id"].as_str().unwrap().len(), 40);

    let todo = run_ql(&workspace, ["todo", "--json"], "todo_json").json();
    assert!(todo[0]["release"].is_null());
    assert_eq!(todo[0]["issues"][0]["title"], "JSON issue");

    let show = run_ql(&workspace, ["show", "demo-1", "--json"], "show_json").json();
    assert_eq!(show["project"], "demo");
    assert_eq!(show["log"][0]["action"], "created");
}

#[test]
fn test_actor_flag_overrides_env() {
    let workspace = QlWorkspace::init("demo");
    run_ok(
        &workspace,
        ["--actor", "Someone <s@example.com>", "add", "Attributed"],
        "add",
    );
    let show = run_ok(&workspace, ["show", "demo-1"], "show");
    assert!(show.contains("Creator: Someone <s@example.com>"));
}

#[test]
fn test_dir_flag_discovers_from_subdirectory() {
    let workspace = QlWorkspace::init("demo");
    let nested = workspace.root.join("src").join("deep");
    std::fs::create_dir_all(&nested).unwrap();

    let nested_str = nested.to_string_lossy().into_owned();
    run_ok(&workspace, ["--dir", nested_str.as_str(), "add", "From below"], "add");
    let todo = run_ok(&workspace, ["todo"], "todo");
    assert!(todo.contains("demo-1: From below"));
}

#[test]
fn test_version() {
    let workspace = QlWorkspace::new();
    common::cli::ql_command(&workspace)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ql version "));

    common::cli::ql_command(&workspace)
        .args(["version", "--short"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_completions() {
    let workspace = QlWorkspace::new();
    common::cli::ql_command(&workspace)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ql"));
}
