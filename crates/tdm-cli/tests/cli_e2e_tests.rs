//! CLI end-to-end tests that invoke the compiled `tdm` binary.
//!
//! Every invocation gets an isolated `HOME` and explicit roots so the user's
//! real settings are never read.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tdm_test_utils::TestTrees;
use tdm_test_utils::git::fake_git_dir;

/// `tdm` pointed at the two roots of `trees`, run from the tracked root.
fn tdm(trees: &TestTrees) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tdm"));
    cmd.current_dir(trees.tracked_root())
        .env("HOME", trees.root())
        .env_remove("TDM_CONFIG")
        .env_remove("TDM_TRACKED_ROOT")
        .env_remove("TDM_MIRROR_ROOT")
        .env_remove("RUST_LOG")
        .arg("--tracked-root")
        .arg(trees.tracked_root())
        .arg("--mirror-root")
        .arg(trees.mirror_root());
    cmd
}

// ============================================================================
// Help and usage
// ============================================================================

#[test]
fn help_lists_commands() {
    Command::new(assert_cmd::cargo::cargo_bin!("tdm"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("track"))
        .stdout(predicate::str::contains("refresh"))
        .stdout(predicate::str::contains("apply"));
}

#[test]
fn version_flag() {
    Command::new(assert_cmd::cargo::cargo_bin!("tdm"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tdm"));
}

#[test]
fn no_command_prints_hint() {
    let trees = TestTrees::new();
    tdm(&trees)
        .assert()
        .success()
        .stdout(predicate::str::contains("tdm --help"));
}

#[test]
fn unknown_command_fails() {
    let trees = TestTrees::new();
    tdm(&trees).arg("push").assert().failure();
}

// ============================================================================
// track
// ============================================================================

#[test]
fn track_relative_path() {
    let trees = TestTrees::new();
    trees.write_tracked(".bashrc", "export EDITOR=vim\n");

    tdm(&trees)
        .args(["track", ".bashrc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 action done"));

    assert_eq!(trees.read_mirror(".bashrc"), "export EDITOR=vim\n");
}

#[test]
fn add_alias_tracks() {
    let trees = TestTrees::new();
    trees.write_tracked(".config/git/config", "[core]\n");

    tdm(&trees).args(["add", ".config"]).assert().success();

    trees.assert_mirror_exists(".config/git/config");
}

#[test]
fn track_logs_each_action_to_stderr() {
    let trees = TestTrees::new();
    trees.write_tracked(".zshrc", "bindkey -e");

    tdm(&trees)
        .args(["track", ".zshrc"])
        .assert()
        .success()
        .stderr(predicate::str::contains("copy"));
}

#[test]
fn quiet_suppresses_action_logs() {
    let trees = TestTrees::new();
    trees.write_tracked(".zshrc", "bindkey -e");

    tdm(&trees)
        .args(["--quiet", "track", ".zshrc"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn track_archives_repository() {
    let trees = TestTrees::new();
    trees.write_tracked("project/README.md", "# project");
    fake_git_dir(&trees.tracked("project"));

    tdm(&trees).args(["track", "project"]).assert().success();

    assert!(trees.mirror("project/.git.zip").is_file());
    trees.assert_mirror_missing("project/.git");
}

#[test]
fn track_outside_tracked_root_fails() {
    let trees = TestTrees::new();
    let outside = trees.root().join("outside.txt");
    fs::write(&outside, "x").unwrap();

    tdm(&trees)
        .arg("track")
        .arg(&outside)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not inside"))
        .stderr(predicate::str::contains("1 operation(s) failed"));
}

#[test]
fn track_missing_path_fails() {
    let trees = TestTrees::new();
    tdm(&trees)
        .args(["track", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn track_dry_run_prints_plan_and_writes_nothing() {
    let trees = TestTrees::new();
    trees.write_tracked(".bashrc", "x");

    tdm(&trees)
        .args(["track", ".bashrc", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would"))
        .stdout(predicate::str::contains("1 action planned"));

    trees.assert_mirror_missing(".bashrc");
}

// ============================================================================
// refresh and apply
// ============================================================================

#[test]
fn refresh_propagates_deletion() {
    let trees = TestTrees::new();
    trees.write_tracked("keep.txt", "new");
    trees.write_mirror("keep.txt", "old");
    trees.write_mirror("gone.txt", "old");

    tdm(&trees).arg("refresh").assert().success();

    assert_eq!(trees.read_mirror("keep.txt"), "new");
    trees.assert_mirror_missing("gone.txt");
}

#[test]
fn apply_writes_tracked_tree() {
    let trees = TestTrees::new();
    trees.write_mirror(".vimrc", "set nu");

    tdm(&trees).arg("apply").assert().success();

    assert_eq!(trees.read_tracked(".vimrc"), "set nu");
}

#[test]
fn sync_alias_applies() {
    let trees = TestTrees::new();
    trees.write_mirror(".inputrc", "set editing-mode vi");

    tdm(&trees).arg("sync").assert().success();

    trees.assert_tracked_exists(".inputrc");
}

#[test]
fn apply_with_corrupt_archive_exits_nonzero_but_copies_rest() {
    let trees = TestTrees::new();
    trees.write_mirror("broken/.git.zip", "not a zip");
    trees.write_mirror(".profile", "profile");

    tdm(&trees)
        .arg("apply")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 operation(s) failed"));

    assert_eq!(trees.read_tracked(".profile"), "profile");
}

#[test]
fn missing_mirror_is_nothing_to_do() {
    let trees = TestTrees::new();
    fs::remove_dir(trees.mirror_root()).unwrap();

    tdm(&trees)
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 actions done"));
}

// ============================================================================
// configuration
// ============================================================================

#[test]
fn roots_from_environment() {
    let trees = TestTrees::new();
    trees.write_tracked(".bashrc", "env");

    Command::new(assert_cmd::cargo::cargo_bin!("tdm"))
        .current_dir(trees.tracked_root())
        .env("HOME", trees.root())
        .env_remove("TDM_CONFIG")
        .env("TDM_TRACKED_ROOT", trees.tracked_root())
        .env("TDM_MIRROR_ROOT", trees.mirror_root())
        .args(["track", ".bashrc"])
        .assert()
        .success();

    assert_eq!(trees.read_mirror(".bashrc"), "env");
}

#[test]
fn roots_from_config_file() {
    let trees = TestTrees::new();
    trees.write_tracked(".bashrc", "config");
    let config = trees.root().join("tdm.json");
    fs::write(
        &config,
        format!(
            "{{\"tracked_root\": {:?}, \"mirror_root\": {:?}}}",
            trees.tracked_root(),
            trees.mirror_root()
        ),
    )
    .unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("tdm"))
        .current_dir(trees.tracked_root())
        .env("HOME", trees.root())
        .env_remove("TDM_TRACKED_ROOT")
        .env_remove("TDM_MIRROR_ROOT")
        .arg("--config")
        .arg(&config)
        .args(["track", ".bashrc"])
        .assert()
        .success();

    assert_eq!(trees.read_mirror(".bashrc"), "config");
}

#[test]
fn missing_config_file_fails() {
    let trees = TestTrees::new();
    tdm(&trees)
        .arg("--config")
        .arg(trees.root().join("absent.toml"))
        .arg("refresh")
        .assert()
        .code(1);
}

#[test]
fn overlapping_roots_fail() {
    let trees = TestTrees::new();
    Command::new(assert_cmd::cargo::cargo_bin!("tdm"))
        .current_dir(trees.tracked_root())
        .env("HOME", trees.root())
        .env_remove("TDM_CONFIG")
        .arg("--tracked-root")
        .arg(trees.mirror("nested"))
        .arg("--mirror-root")
        .arg(trees.mirror_root())
        .arg("refresh")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"));
}
