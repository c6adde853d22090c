//! End-to-end tests of the `gitform` binary.

mod common;

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

use common::TestRepo;

/// The binary, isolated from the user's global configuration.
fn gitform(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gitform").unwrap();
    cmd.current_dir(root)
        .env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join(".xdg"))
        .env_remove("GITFORM_CONFIG")
        .env_remove("GITFORM_LOG");
    cmd
}

fn write_manifest(root: &Path, contents: &str) {
    std::fs::write(root.join("gitform.toml"), contents).unwrap();
}

const TAG_MANIFEST: &str = r#"
[[resource]]
id = "release"
type = "tag"
directory = "work"
name = "v1.0.0"
message = "first release"
"#;

#[test]
fn version_and_help() {
    let repo = TestRepo::empty();
    gitform(repo.root())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("gitform "));

    gitform(repo.root())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn plan_without_manifest_fails() {
    let repo = TestRepo::empty();
    gitform(repo.root())
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load manifest"));
}

#[test]
fn empty_manifest_has_no_changes() {
    let repo = TestRepo::empty();
    write_manifest(repo.root(), "");
    gitform(repo.root())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes."));
}

#[test]
fn plan_apply_then_noop() {
    let repo = TestRepo::new();
    write_manifest(repo.root(), TAG_MANIFEST);

    gitform(repo.root())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("+ release (tag): create"))
        .stdout(predicate::str::contains("Plan: 1 to change, 0 unchanged."));

    gitform(repo.root())
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("Apply complete: 1 changed, 0 forgotten."));

    assert_eq!(
        repo.git_output(&["rev-parse", "v1.0.0^{commit}"]),
        repo.head().to_string()
    );
    assert!(repo.root().join("gitform.state.json").exists());

    gitform(repo.root())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes."));
}

#[test]
fn plan_json_carries_digest_and_apply_checks_it() {
    let repo = TestRepo::new();
    write_manifest(repo.root(), TAG_MANIFEST);

    let out = gitform(repo.root())
        .args(["plan", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let digest = report["digest"].as_str().unwrap().to_string();
    assert_eq!(report["resources"][0]["action"], "create");

    gitform(repo.root())
        .args(["apply", "--expect", "0000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("plan changed since it was reviewed"));

    gitform(repo.root())
        .args(["apply", "--expect", &digest])
        .assert()
        .success();
}

#[test]
fn unknown_target_is_rejected() {
    let repo = TestRepo::new();
    write_manifest(repo.root(), TAG_MANIFEST);
    gitform(repo.root())
        .args(["plan", "--target", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no resource with id 'nope'"));
}

#[test]
fn removed_resource_is_forgotten() {
    let repo = TestRepo::new();
    write_manifest(repo.root(), TAG_MANIFEST);
    gitform(repo.root()).arg("apply").assert().success();

    write_manifest(repo.root(), "");
    gitform(repo.root())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("  - release"));

    gitform(repo.root())
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("release: forgotten"));

    // The tag itself is left alone.
    assert!(!repo.git_output(&["tag", "--list", "v1.0.0"]).is_empty());
}

#[test]
fn import_then_forget() {
    let repo = TestRepo::new();
    repo.git_cmd(&["tag", "existing"]);

    gitform(repo.root())
        .args(["import", "tag", "work|existing", "adopted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported tag 'work|existing' as 'adopted'."));

    gitform(repo.root())
        .args(["import", "tag", "work|existing", "adopted"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already has recorded state"));

    gitform(repo.root())
        .args(["forget", "adopted"])
        .assert()
        .success();

    gitform(repo.root())
        .args(["forget", "adopted"])
        .assert()
        .failure();
}

#[test]
fn import_rejects_unknown_kind() {
    let repo = TestRepo::new();
    gitform(repo.root())
        .args(["import", "branch", "work", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown resource type 'branch'"));
}

#[test]
fn read_status_json() {
    let repo = TestRepo::new();
    repo.write("new.txt", "n\n");

    let out = gitform(repo.root())
        .args(["read", "status", "work", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let status: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(status["is_clean"], false);
    assert_eq!(status["files"][0]["path"], "new.txt");
}

#[test]
fn read_log_respects_max_count() {
    let repo = TestRepo::new();
    let second = repo.commit_file("a.txt", "a\n", "second");

    gitform(repo.root())
        .args(["read", "log", "work", "--max-count", "1"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", second)));
}

#[test]
fn read_outside_repository_fails() {
    let repo = TestRepo::empty();
    gitform(repo.root())
        .args(["read", "status", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open repository"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let repo = TestRepo::empty();
    gitform(repo.root())
        .args(["config", "init", "--manifest", "infra.toml"])
        .assert()
        .success();
    assert!(repo.root().join(".gitform/config.toml").exists());

    gitform(repo.root())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("manifest = infra.toml"));

    gitform(repo.root())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn completion_generates_script() {
    let repo = TestRepo::empty();
    gitform(repo.root())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gitform"));
}
