//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in
//! gitform. Every repository read and write flows through [`Git`], which
//! returns strong types and normalizes libgit2 errors into [`GitError`].
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Directory is not a repository
//! - [`GitError::RevisionNotFound`]: A revision string did not resolve
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::Remote`]: A network operation (list, clone, push) failed
//!
//! Library "not found" outcomes that callers branch on are returned as
//! [`Lookup::NotFound`] instead of an error.
//!
//! # Example
//!
//! ```ignore
//! use gitform::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.resolve_revision("HEAD")?;
//! println!("HEAD is at {}", head.short(7));
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use thiserror::Error;
use tracing::debug;

use super::transport;
use crate::auth::Transport;
use crate::core::identity::{CommitIdentity, RecordedSignature};
use crate::core::types::{Oid, RefName, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Directory is not a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo { path: PathBuf },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound { refname: String },

    /// A revision string could not be resolved to a commit.
    #[error("cannot resolve revision '{revision}'")]
    RevisionNotFound { revision: String },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound { oid: String },

    /// Named remote does not exist.
    #[error("remote not found: {name}")]
    RemoteNotFound { name: String },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid { oid: String },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName { message: String },

    /// A network operation against a remote failed.
    #[error("cannot {operation} {url}: {message}")]
    Remote {
        operation: &'static str,
        url: String,
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError { message: String },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal { message: String },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidRefName {
                message: format!("{}: {}", context, err.message()),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    fn remote(operation: &'static str, url: &str, err: git2::Error) -> Self {
        GitError::Remote {
            operation,
            url: url.to_string(),
            message: err.message().to_string(),
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) => GitError::InvalidRefName { message: msg },
        }
    }
}

/// Result of looking something up that may legitimately be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    /// Convert into an `Option`.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Per-file state in the staging area or the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Unmodified,
    Untracked,
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    UpdatedButUnmerged,
}

impl FileState {
    /// Porcelain-style status letter.
    pub fn code(self) -> char {
        match self {
            FileState::Unmodified => ' ',
            FileState::Untracked => '?',
            FileState::Modified => 'M',
            FileState::Added => 'A',
            FileState::Deleted => 'D',
            FileState::Renamed => 'R',
            FileState::Copied => 'C',
            FileState::UpdatedButUnmerged => 'U',
        }
    }
}

/// Status of one path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StatusEntry {
    pub path: String,
    pub staging: FileState,
    pub worktree: FileState,
}

impl StatusEntry {
    /// True when the file has changes staged for commit.
    pub fn is_staged(&self) -> bool {
        !matches!(self.staging, FileState::Unmodified | FileState::Untracked)
    }

    /// True when a tracked file was modified or deleted in the working tree.
    pub fn is_tracked_change(&self) -> bool {
        matches!(self.worktree, FileState::Modified | FileState::Deleted)
    }
}

/// A commit as read back from the object database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetails {
    pub oid: Oid,
    pub message: String,
    pub author: RecordedSignature,
    pub committer: RecordedSignature,
    pub tree: Oid,
    pub parents: Vec<Oid>,
    /// Paths changed relative to the first parent (or the empty tree).
    pub files: Vec<String>,
}

/// Classification of a tag reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKind {
    Annotated {
        message: String,
        tagger: Option<RecordedSignature>,
    },
    Lightweight,
}

/// A ref with its name and target OID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    pub name: String,
    pub oid: Oid,
}

/// A local or remote-tracking branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub remote: bool,
    pub oid: Option<Oid>,
    pub is_head: bool,
}

/// A configured remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub urls: Vec<String>,
}

/// Which configuration file(s) to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigScope {
    /// All levels merged with normal precedence.
    #[default]
    Merged,
    Local,
    Global,
    System,
}

/// Options for [`Git::clone`].
#[derive(Debug, Clone, Default)]
pub struct CloneRequest {
    /// Branch ref to check out; the remote's default when `None`.
    pub reference: Option<RefName>,
    pub bare: bool,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2` directly.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Opening, Init and Clone
    // =========================================================================

    /// Open the repository rooted at `path` (working directory or bare dir).
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `path` is not a repository
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Check whether `path` holds a repository.
    pub fn is_repository(path: &Path) -> bool {
        git2::Repository::open(path).is_ok()
    }

    /// Initialize a repository at `path`.
    ///
    /// Re-initializing an existing repository is harmless and returns it.
    pub fn init(path: &Path, bare: bool, initial_branch: Option<&str>) -> Result<Self, GitError> {
        let mut opts = git2::RepositoryInitOptions::new();
        opts.bare(bare).mkpath(true);
        if let Some(branch) = initial_branch {
            opts.initial_head(branch);
        }
        let repo = git2::Repository::init_opts(path, &opts)
            .map_err(|e| GitError::from_git2(e, &path.display().to_string()))?;
        debug!(path = %path.display(), bare, "initialized repository");
        Ok(Self { repo })
    }

    /// Clone `url` into `path`.
    pub fn clone(
        url: &str,
        path: &Path,
        request: &CloneRequest,
        auth: Option<&Transport>,
    ) -> Result<Self, GitError> {
        let mut builder = git2::build::RepoBuilder::new();
        builder.bare(request.bare);
        if let Some(reference) = &request.reference {
            builder.branch(reference.short_name());
        }

        let headers = auth.map(Transport::http_headers).unwrap_or_default();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let mut fetch = git2::FetchOptions::new();
        fetch.remote_callbacks(transport::callbacks(auth));
        fetch.custom_headers(&header_refs);
        builder.fetch_options(fetch);

        let repo = builder
            .clone(url, path)
            .map_err(|e| GitError::remote("clone", url, e))?;
        debug!(url, path = %path.display(), "cloned repository");
        Ok(Self { repo })
    }

    /// Path of the working directory, `None` for bare repositories.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    // =========================================================================
    // Revision Resolution
    // =========================================================================

    /// Get HEAD's commit, or `NotFound` for an unborn branch.
    pub fn head_oid(&self) -> Result<Lookup<Oid>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                return Ok(Lookup::NotFound)
            }
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };
        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        Ok(Lookup::Found(to_oid(commit.id())?))
    }

    /// The ref HEAD points at (e.g. `refs/heads/main`), even when unborn.
    ///
    /// Returns `None` for a detached HEAD.
    pub fn head_ref_name(&self) -> Result<Option<String>, GitError> {
        let head = self
            .repo
            .find_reference("HEAD")
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        Ok(head.symbolic_target().map(String::from))
    }

    /// Resolve a revision (branch, tag, `HEAD`, hash prefix, `rev~n`...) to a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::RevisionNotFound`] if it does not name a commit
    pub fn resolve_revision(&self, revision: &str) -> Result<Oid, GitError> {
        let not_found = || GitError::RevisionNotFound {
            revision: revision.to_string(),
        };
        let object = self.repo.revparse_single(revision).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound
            | git2::ErrorCode::InvalidSpec
            | git2::ErrorCode::Ambiguous
            | git2::ErrorCode::UnbornBranch => not_found(),
            _ => GitError::from_git2(e, revision),
        })?;
        let commit = object.peel_to_commit().map_err(|_| not_found())?;
        to_oid(commit.id())
    }

    /// Commits at the tip of every reference, HEAD included, de-duplicated.
    pub fn all_ref_tips(&self) -> Result<Vec<Oid>, GitError> {
        let mut tips = BTreeSet::new();
        if let Lookup::Found(head) = self.head_oid()? {
            tips.insert(head);
        }
        for reference in self.repo.references()? {
            let reference = reference?;
            if let Ok(commit) = reference.peel_to_commit() {
                tips.insert(to_oid(commit.id())?);
            }
        }
        Ok(tips.into_iter().collect())
    }

    // =========================================================================
    // Working Tree Status and Staging
    // =========================================================================

    /// Per-file status, untracked files included, sorted by path.
    pub fn status(&self) -> Result<Vec<StatusEntry>, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        let mut entries = Vec::new();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue; // non-UTF8 path
            };
            let (staging, worktree) = classify(entry.status());
            entries.push(StatusEntry {
                path: path.to_string(),
                staging,
                worktree,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// Stage the given paths: deletions are removed from the index,
    /// everything else is added.
    pub fn stage(&self, changes: &[(String, FileState)]) -> Result<(), GitError> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut index = self.repo.index()?;
        for (path, worktree) in changes {
            let p = Path::new(path);
            let result = if *worktree == FileState::Deleted {
                index.remove_path(p)
            } else {
                index.add_path(p)
            };
            result.map_err(|e| GitError::from_git2(e, path))?;
        }
        index.write()?;
        Ok(())
    }

    // =========================================================================
    // Commits
    // =========================================================================

    /// Commit the current index on top of HEAD and advance HEAD.
    pub fn create_commit(
        &self,
        message: &str,
        author: &CommitIdentity,
        committer: &CommitIdentity,
    ) -> Result<Oid, GitError> {
        let author_sig = git2::Signature::now(&author.name, &author.email)
            .map_err(|e| GitError::from_git2(e, "author"))?;
        let committer_sig = git2::Signature::now(&committer.name, &committer.email)
            .map_err(|e| GitError::from_git2(e, "committer"))?;

        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.head_oid()? {
            Lookup::Found(oid) => Some(self.repo.find_commit(from_oid(&oid)?)?),
            Lookup::NotFound => None,
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let id = self
            .repo
            .commit(
                Some("HEAD"),
                &author_sig,
                &committer_sig,
                message,
                &tree,
                &parents,
            )
            .map_err(|e| GitError::from_git2(e, "commit"))?;
        to_oid(id)
    }

    /// Read a commit back, including the files it changed.
    pub fn commit_details(&self, oid: &Oid) -> Result<CommitDetails, GitError> {
        let commit = self
            .repo
            .find_commit(from_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let parents = commit
            .parent_ids()
            .map(to_oid)
            .collect::<Result<Vec<_>, _>>()?;

        let author = recorded(&commit.author());
        let committer = recorded(&commit.committer());
        let details = CommitDetails {
            oid: oid.clone(),
            message: commit.message().unwrap_or("").to_string(),
            author,
            committer,
            tree: to_oid(commit.tree_id())?,
            parents,
            files: self.changed_paths(oid)?,
        };
        Ok(details)
    }

    /// Paths changed by a commit relative to its first parent.
    ///
    /// Root commits are compared against the empty tree.
    pub fn changed_paths(&self, oid: &Oid) -> Result<Vec<String>, GitError> {
        let commit = self
            .repo
            .find_commit(from_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = BTreeSet::new();
        for delta in diff.deltas() {
            let path = delta.new_file().path().or_else(|| delta.old_file().path());
            if let Some(p) = path.and_then(Path::to_str) {
                files.insert(p.to_string());
            }
        }
        Ok(files.into_iter().collect())
    }

    /// Parents of a commit, first parent first.
    pub fn commit_parents(&self, oid: &Oid) -> Result<Vec<Oid>, GitError> {
        let commit = self
            .repo
            .find_commit(from_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        commit.parent_ids().map(to_oid).collect()
    }

    /// Committer timestamp of a commit, seconds since the epoch.
    pub fn commit_time(&self, oid: &Oid) -> Result<i64, GitError> {
        let commit = self
            .repo
            .find_commit(from_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        let seconds = commit.committer().when().seconds();
        Ok(seconds)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Create a tag pointing at `target`.
    ///
    /// With `annotation` an annotated tag object is written, otherwise only
    /// the `refs/tags/<name>` reference.
    pub fn create_tag(
        &self,
        name: &str,
        target: &Oid,
        annotation: Option<(&str, &CommitIdentity)>,
    ) -> Result<(), GitError> {
        RefName::for_tag(name)?;
        let object = self
            .repo
            .find_object(from_oid(target)?, None)
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;

        match annotation {
            Some((message, tagger)) => {
                let sig = git2::Signature::now(&tagger.name, &tagger.email)
                    .map_err(|e| GitError::from_git2(e, "tagger"))?;
                self.repo
                    .tag(name, &object, &sig, message, false)
                    .map_err(|e| GitError::from_git2(e, name))?;
            }
            None => {
                self.repo
                    .tag_lightweight(name, &object, false)
                    .map_err(|e| GitError::from_git2(e, name))?;
            }
        }
        Ok(())
    }

    /// Delete `refs/tags/<name>`.
    pub fn delete_tag(&self, name: &str) -> Result<(), GitError> {
        self.repo
            .tag_delete(name)
            .map_err(|e| GitError::from_git2(e, &format!("refs/tags/{}", name)))
    }

    /// Object id the tag reference points at directly (tag object or commit).
    pub fn tag_ref_target(&self, name: &str) -> Result<Lookup<Oid>, GitError> {
        let refname = RefName::for_tag(name)?;
        self.try_resolve_ref(refname.as_str())
    }

    /// Load the annotated tag object at `oid`.
    ///
    /// `NotFound` means no tag object lives there, i.e. the tag is lightweight.
    pub fn find_tag_object(&self, oid: &Oid) -> Result<Lookup<TagKind>, GitError> {
        match self.repo.find_tag(from_oid(oid)?) {
            Ok(tag) => Ok(Lookup::Found(TagKind::Annotated {
                message: tag.message().unwrap_or("").to_string(),
                tagger: tag.tagger().map(|s| recorded(&s)),
            })),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(Lookup::NotFound),
            Err(e) => Err(GitError::from_git2(e, oid.as_str())),
        }
    }

    /// Commit a tag ultimately points at.
    pub fn peel_tag(&self, name: &str) -> Result<Oid, GitError> {
        let refname = RefName::for_tag(name)?;
        let reference = self
            .repo
            .find_reference(refname.as_str())
            .map_err(|e| GitError::from_git2(e, refname.as_str()))?;
        let commit = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, refname.as_str()))?;
        to_oid(commit.id())
    }

    /// Names of all tags, sorted.
    pub fn tag_names(&self) -> Result<Vec<String>, GitError> {
        let names = self.repo.tag_names(None)?;
        let mut out: Vec<String> = names.iter().flatten().map(String::from).collect();
        out.sort();
        Ok(out)
    }

    // =========================================================================
    // Branches
    // =========================================================================

    /// Local and remote-tracking branches.
    pub fn list_branches(&self) -> Result<Vec<BranchInfo>, GitError> {
        let mut out = Vec::new();
        for item in self.repo.branches(None)? {
            let (branch, kind) = item?;
            let Some(name) = branch.name()?.map(String::from) else {
                continue;
            };
            let oid = match branch.get().target() {
                Some(id) => Some(to_oid(id)?),
                None => None,
            };
            out.push(BranchInfo {
                name,
                remote: kind == git2::BranchType::Remote,
                oid,
                is_head: branch.is_head(),
            });
        }
        out.sort_by(|a, b| (a.remote, &a.name).cmp(&(b.remote, &b.name)));
        Ok(out)
    }

    // =========================================================================
    // Remotes
    // =========================================================================

    /// URLs of a remote, in configuration order.
    pub fn remote_urls(&self, name: &str) -> Result<Lookup<Vec<String>>, GitError> {
        match self.repo.find_remote(name) {
            Ok(_) => {}
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(Lookup::NotFound),
            Err(e) if e.code() == git2::ErrorCode::InvalidSpec => return Ok(Lookup::NotFound),
            Err(e) => return Err(GitError::from_git2(e, name)),
        }

        let config = self.repo.config()?;
        let key = format!("remote.{}.url", name);
        let mut urls = Vec::new();
        let mut entries = config.multivar(&key, None)?;
        while let Some(entry) = entries.next() {
            let entry = entry?;
            if let Some(value) = entry.value() {
                urls.push(value.to_string());
            }
        }
        Ok(Lookup::Found(urls))
    }

    /// Create a remote with one or more URLs.
    pub fn create_remote(&self, name: &str, urls: &[String]) -> Result<(), GitError> {
        let (first, rest) = urls.split_first().ok_or_else(|| GitError::Internal {
            message: format!("remote {} needs at least one url", name),
        })?;
        self.repo
            .remote(name, first)
            .map_err(|e| GitError::from_git2(e, name))?;
        self.add_remote_urls(name, rest)
    }

    /// Replace all URLs of an existing remote.
    pub fn set_remote_urls(&self, name: &str, urls: &[String]) -> Result<(), GitError> {
        let (first, rest) = urls.split_first().ok_or_else(|| GitError::Internal {
            message: format!("remote {} needs at least one url", name),
        })?;
        let mut config = self.repo.config()?;
        let key = format!("remote.{}.url", name);
        match config.remove_multivar(&key, ".*") {
            Ok(()) => {}
            Err(e) if e.code() == git2::ErrorCode::NotFound => {}
            Err(e) => return Err(GitError::from_git2(e, &key)),
        }
        self.repo
            .remote_set_url(name, first)
            .map_err(|e| GitError::from_git2(e, name))?;
        self.add_remote_urls(name, rest)
    }

    fn add_remote_urls(&self, name: &str, urls: &[String]) -> Result<(), GitError> {
        if urls.is_empty() {
            return Ok(());
        }
        let mut config = self.repo.config()?;
        let key = format!("remote.{}.url", name);
        for url in urls {
            // "^$" matches no existing value, so each call appends.
            config
                .set_multivar(&key, "^$", url)
                .map_err(|e| GitError::from_git2(e, &key))?;
        }
        Ok(())
    }

    pub fn delete_remote(&self, name: &str) -> Result<(), GitError> {
        self.repo.remote_delete(name).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => GitError::RemoteNotFound {
                name: name.to_string(),
            },
            _ => GitError::from_git2(e, name),
        })
    }

    /// All configured remotes with their URLs.
    pub fn list_remotes(&self) -> Result<Vec<RemoteInfo>, GitError> {
        let names = self.repo.remotes()?;
        let mut out = Vec::new();
        for name in names.iter().flatten() {
            if let Lookup::Found(urls) = self.remote_urls(name)? {
                out.push(RemoteInfo {
                    name: name.to_string(),
                    urls,
                });
            }
        }
        Ok(out)
    }

    /// List the refs a remote advertises, without touching any local repository.
    pub fn list_remote_refs(url: &str, auth: Option<&Transport>) -> Result<Vec<RefEntry>, GitError> {
        let mut remote =
            git2::Remote::create_detached(url).map_err(|e| GitError::remote("list", url, e))?;
        let connection = remote
            .connect_auth(git2::Direction::Fetch, Some(transport::callbacks(auth)), None)
            .map_err(|e| GitError::remote("list", url, e))?;

        let mut out = Vec::new();
        for head in connection
            .list()
            .map_err(|e| GitError::remote("list", url, e))?
        {
            out.push(RefEntry {
                name: head.name().to_string(),
                oid: to_oid(head.oid())?,
            });
        }
        debug!(url, refs = out.len(), "listed remote refs");
        Ok(out)
    }

    /// Push refspecs to a named remote.
    pub fn push(
        &self,
        remote_name: &str,
        refspecs: &[String],
        auth: Option<&Transport>,
    ) -> Result<(), GitError> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => GitError::RemoteNotFound {
                name: remote_name.to_string(),
            },
            _ => GitError::from_git2(e, remote_name),
        })?;
        let url = remote.url().unwrap_or(remote_name).to_string();

        let headers = auth.map(Transport::http_headers).unwrap_or_default();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let mut opts = git2::PushOptions::new();
        opts.remote_callbacks(transport::push_callbacks(auth));
        opts.custom_headers(&header_refs);

        remote
            .push(refspecs, Some(&mut opts))
            .map_err(|e| GitError::remote("push to", &url, e))?;
        debug!(remote = remote_name, ?refspecs, "pushed");
        Ok(())
    }

    /// Resolve a local ref name to the object it points at, `NotFound` when absent.
    ///
    /// Symbolic refs are followed but tags are not peeled: an annotated tag
    /// yields its tag object, the same id a remote advertises for it.
    pub fn try_resolve_ref(&self, refname: &str) -> Result<Lookup<Oid>, GitError> {
        let reference = match self.repo.find_reference(refname) {
            Ok(reference) => reference,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(Lookup::NotFound),
            Err(e) => return Err(GitError::from_git2(e, refname)),
        };
        let direct = reference
            .resolve()
            .map_err(|e| GitError::from_git2(e, refname))?;
        match direct.target() {
            Some(id) => Ok(Lookup::Found(to_oid(id)?)),
            None => Err(GitError::Internal {
                message: format!("ref {} has no target", refname),
            }),
        }
    }

    /// Expand a short branch or tag name into a full ref name, if one exists.
    pub fn expand_ref(&self, name: &str) -> Result<Lookup<String>, GitError> {
        if name.starts_with("refs/") || name == "HEAD" {
            return Ok(Lookup::Found(name.to_string()));
        }
        match self.repo.resolve_reference_from_short_name(name) {
            Ok(reference) => Ok(reference
                .name()
                .map(|n| Lookup::Found(n.to_string()))
                .unwrap_or(Lookup::NotFound)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(Lookup::NotFound),
            Err(e) => Err(GitError::from_git2(e, name)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Read a single string value from the merged configuration.
    pub fn config_value(&self, key: &str) -> Result<Option<String>, GitError> {
        let config = self.repo.config()?;
        match config.get_string(key) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, key)),
        }
    }

    /// All key/value pairs of one configuration scope, in file order.
    pub fn config_entries(&self, scope: ConfigScope) -> Result<Vec<(String, String)>, GitError> {
        let config = self.repo.config()?;
        let config = match scope {
            ConfigScope::Merged => config,
            ConfigScope::Local => level(&config, git2::ConfigLevel::Local)?,
            ConfigScope::Global => level(&config, git2::ConfigLevel::Global)?,
            ConfigScope::System => level(&config, git2::ConfigLevel::System)?,
        };

        let mut out = Vec::new();
        let mut entries = config.entries(None)?;
        while let Some(entry) = entries.next() {
            let entry = entry?;
            if let (Some(name), Some(value)) = (entry.name(), entry.value()) {
                out.push((name.to_string(), value.to_string()));
            }
        }
        Ok(out)
    }
}

fn level(config: &git2::Config, level: git2::ConfigLevel) -> Result<git2::Config, GitError> {
    match config.open_level(level) {
        Ok(c) => Ok(c),
        // No file at this level reads as empty.
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(git2::Config::new()?),
        Err(e) => Err(GitError::from_git2(e, "config")),
    }
}

fn classify(status: git2::Status) -> (FileState, FileState) {
    if status.is_conflicted() {
        return (FileState::UpdatedButUnmerged, FileState::UpdatedButUnmerged);
    }
    if status.is_wt_new() && !status.intersects(index_flags()) {
        return (FileState::Untracked, FileState::Untracked);
    }

    let staging = if status.is_index_new() {
        FileState::Added
    } else if status.is_index_deleted() {
        FileState::Deleted
    } else if status.is_index_renamed() {
        FileState::Renamed
    } else if status.is_index_modified() || status.is_index_typechange() {
        FileState::Modified
    } else {
        FileState::Unmodified
    };

    let worktree = if status.is_wt_deleted() {
        FileState::Deleted
    } else if status.is_wt_renamed() {
        FileState::Renamed
    } else if status.is_wt_modified() || status.is_wt_typechange() {
        FileState::Modified
    } else {
        FileState::Unmodified
    };

    (staging, worktree)
}

fn index_flags() -> git2::Status {
    git2::Status::INDEX_NEW
        | git2::Status::INDEX_MODIFIED
        | git2::Status::INDEX_DELETED
        | git2::Status::INDEX_RENAMED
        | git2::Status::INDEX_TYPECHANGE
}

fn recorded(sig: &git2::Signature<'_>) -> RecordedSignature {
    let when = sig.when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    let timestamp = DateTime::from_timestamp(when.seconds(), 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&offset)
        .to_rfc3339();
    RecordedSignature {
        name: sig.name().unwrap_or("").to_string(),
        email: sig.email().unwrap_or("").to_string(),
        timestamp,
    }
}

fn to_oid(id: git2::Oid) -> Result<Oid, GitError> {
    Oid::new(id.to_string()).map_err(GitError::from)
}

fn from_oid(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|_| GitError::InvalidOid {
        oid: oid.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod git_error {
        use super::*;

        #[test]
        fn display_formatting() {
            let err = GitError::RevisionNotFound {
                revision: "nope".to_string(),
            };
            assert_eq!(err.to_string(), "cannot resolve revision 'nope'");

            let err = GitError::Remote {
                operation: "list",
                url: "https://example.com/r.git".to_string(),
                message: "timeout".to_string(),
            };
            assert_eq!(err.to_string(), "cannot list https://example.com/r.git: timeout");
        }

        #[test]
        fn type_error_conversion() {
            let err: GitError = TypeError::InvalidOid("x".into()).into();
            assert!(matches!(err, GitError::InvalidOid { .. }));
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn found_converts_to_option() {
            assert_eq!(Lookup::Found(3).found(), Some(3));
            assert_eq!(Lookup::<i32>::NotFound.found(), None);
            assert!(Lookup::Found(()).is_found());
        }
    }

    mod classify_status {
        use super::*;

        #[test]
        fn untracked() {
            assert_eq!(
                classify(git2::Status::WT_NEW),
                (FileState::Untracked, FileState::Untracked)
            );
        }

        #[test]
        fn staged_new_then_modified() {
            assert_eq!(
                classify(git2::Status::INDEX_NEW | git2::Status::WT_MODIFIED),
                (FileState::Added, FileState::Modified)
            );
        }

        #[test]
        fn worktree_deleted() {
            assert_eq!(
                classify(git2::Status::WT_DELETED),
                (FileState::Unmodified, FileState::Deleted)
            );
        }

        #[test]
        fn conflicted() {
            assert_eq!(
                classify(git2::Status::CONFLICTED),
                (FileState::UpdatedButUnmerged, FileState::UpdatedButUnmerged)
            );
        }
    }

    mod status_entry {
        use super::*;

        fn entry(staging: FileState, worktree: FileState) -> StatusEntry {
            StatusEntry {
                path: "f".into(),
                staging,
                worktree,
            }
        }

        #[test]
        fn staged_detection() {
            assert!(entry(FileState::Added, FileState::Unmodified).is_staged());
            assert!(!entry(FileState::Untracked, FileState::Untracked).is_staged());
            assert!(!entry(FileState::Unmodified, FileState::Modified).is_staged());
        }

        #[test]
        fn tracked_change_detection() {
            assert!(entry(FileState::Unmodified, FileState::Modified).is_tracked_change());
            assert!(entry(FileState::Unmodified, FileState::Deleted).is_tracked_change());
            assert!(!entry(FileState::Untracked, FileState::Untracked).is_tracked_change());
        }

        #[test]
        fn codes() {
            assert_eq!(FileState::Untracked.code(), '?');
            assert_eq!(FileState::Modified.code(), 'M');
            assert_eq!(FileState::Unmodified.code(), ' ');
        }
    }
}
