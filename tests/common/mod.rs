//! Shared fixtures for integration tests.
//!
//! Repositories are built with the `git` CLI so the code under test only
//! ever reads state it did not write itself.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use gitform::core::config::Config;
use gitform::core::types::Oid;
use gitform::engine::Context;
use gitform::git::Git;

/// A temporary project directory holding one working repository at `work/`.
pub struct TestRepo {
    pub dir: TempDir,
}

impl TestRepo {
    /// Repository on `main` with one commit of `README.md`.
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit");
        repo
    }

    /// Repository on `main` with no commits.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let work = dir.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        run_git(&work, &["init", "-b", "main"]);
        configure_identity(&work);
        Self { dir }
    }

    /// Project root; resource directories are relative to it.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The working repository.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    pub fn git(&self) -> Git {
        Git::open(&self.path()).expect("failed to open test repo")
    }

    pub fn ctx(&self) -> Context {
        Context::new(self.root(), Config::default())
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    /// Write, stage and commit one file; returns the new HEAD.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> Oid {
        self.write(path, content);
        self.git_cmd(&["add", path]);
        self.git_cmd(&["commit", "-m", message]);
        self.head()
    }

    /// Commit with an explicit committer date, e.g. `2024-01-02T00:00:00Z`.
    pub fn commit_at(&self, path: &str, content: &str, message: &str, date: &str) -> Oid {
        self.write(path, content);
        self.git_cmd(&["add", path]);
        run_git_env(
            &self.path(),
            &["commit", "-m", message],
            &[("GIT_AUTHOR_DATE", date), ("GIT_COMMITTER_DATE", date)],
        );
        self.head()
    }

    pub fn head(&self) -> Oid {
        Oid::new(self.git_output(&["rev-parse", "HEAD"])).unwrap()
    }

    pub fn git_cmd(&self, args: &[&str]) {
        run_git(&self.path(), args);
    }

    pub fn git_output(&self, args: &[&str]) -> String {
        git_output(&self.path(), args)
    }

    /// A bare repository at `remote.git` seeded from this one, set as `origin`.
    pub fn bare_remote(&self) -> PathBuf {
        let remote = self.root().join("remote.git");
        run_git(self.root(), &["init", "--bare", "-b", "main", "remote.git"]);
        let url = remote.to_string_lossy().into_owned();
        self.git_cmd(&["remote", "add", "origin", &url]);
        self.git_cmd(&["push", "origin", "main"]);
        remote
    }
}

/// Push a new commit to `remote` from a throwaway clone; returns its hash.
pub fn advance_remote(remote: &Path, file: &str) -> Oid {
    let scratch = TempDir::new().unwrap();
    let url = remote.to_string_lossy().into_owned();
    run_git(scratch.path(), &["clone", &url, "clone"]);
    let clone = scratch.path().join("clone");
    configure_identity(&clone);
    std::fs::write(clone.join(file), "remote change\n").unwrap();
    run_git(&clone, &["add", file]);
    run_git(&clone, &["commit", "-m", "remote change"]);
    run_git(&clone, &["push", "origin", "HEAD:main"]);
    Oid::new(git_output(&clone, &["rev-parse", "HEAD"])).unwrap()
}

pub fn configure_identity(dir: &Path) {
    run_git(dir, &["config", "user.email", "test@example.com"]);
    run_git(dir, &["config", "user.name", "Test User"]);
}

pub fn run_git(dir: &Path, args: &[&str]) {
    run_git_env(dir, args, &[]);
}

pub fn run_git_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(env.iter().copied())
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(output.status.success(), "git {:?} failed", args);
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}
