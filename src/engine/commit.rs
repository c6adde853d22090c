//! engine::commit
//!
//! Decides whether a commit is needed, builds identities, and commits.
//!
//! # Flow
//!
//! 1. With `all`, stage every tracked file that is modified or deleted in
//!    the working tree (never untracked files)
//! 2. Re-read status; with nothing staged, stop: a clean tree is a no-op
//! 3. Resolve author then committer, falling back to repository config
//! 4. Commit and read the commit back, so recorded state carries the
//!    values libgit2 actually wrote

use tracing::{debug, info};

use super::EngineError;
use crate::core::identity::{CommitIdentity, PartialIdentity};
use crate::git::{CommitDetails, FileState, Git, StatusEntry};

/// Inputs for one commit.
#[derive(Debug, Clone, Default)]
pub struct CommitRequest {
    pub message: String,
    /// Stage tracked modifications and deletions first.
    pub all: bool,
    pub author: PartialIdentity,
    pub committer: PartialIdentity,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing staged; no commit was created.
    Clean,
    Created(CommitDetails),
}

/// True when committing would record something.
///
/// Read-only: with `all`, tracked modifications count as pending instead of
/// being staged.
pub fn has_pending_changes(git: &Git, all: bool) -> Result<bool, EngineError> {
    let status = git.status()?;
    Ok(status
        .iter()
        .any(|e| e.is_staged() || (all && e.is_tracked_change())))
}

/// Run the commit flow.
pub fn commit(git: &Git, request: &CommitRequest) -> Result<CommitOutcome, EngineError> {
    if request.all {
        let tracked: Vec<(String, FileState)> = git
            .status()?
            .into_iter()
            .filter(StatusEntry::is_tracked_change)
            .map(|e| (e.path, e.worktree))
            .collect();
        debug!(files = tracked.len(), "staging tracked changes");
        git.stage(&tracked)?;
    }

    if !git.status()?.iter().any(StatusEntry::is_staged) {
        debug!("working tree clean, skipping commit");
        return Ok(CommitOutcome::Clean);
    }

    let (author, committer) = resolve_identities(git, &request.author, &request.committer)?;
    let oid = git.create_commit(&request.message, &author, &committer)?;
    info!(commit = %oid.short(7), "created commit");

    Ok(CommitOutcome::Created(git.commit_details(&oid)?))
}

/// Resolve author and committer with repository config fallback.
///
/// Author fields fall back to `author.*`, then `user.*`. A committer with
/// no fields set becomes the author; otherwise its missing fields fall back
/// to `committer.*`, then `user.*`, then the author.
///
/// # Errors
///
/// [`EngineError::MissingIdentity`] when a name or email is still empty.
pub fn resolve_identities(
    git: &Git,
    author: &PartialIdentity,
    committer: &PartialIdentity,
) -> Result<(CommitIdentity, CommitIdentity), EngineError> {
    let lookup = |key: &str| git.config_value(key);
    let author = resolve_with(author, "author", &lookup, None)?;
    let committer = if committer.is_unspecified() {
        author.clone()
    } else {
        resolve_with(committer, "committer", &lookup, Some(&author))?
    };
    Ok((author, committer))
}

/// Resolve the identity used as tagger for annotated tags.
///
/// Git records the committer identity as tagger, so the same config keys apply.
pub fn resolve_tagger(git: &Git) -> Result<CommitIdentity, EngineError> {
    let lookup = |key: &str| git.config_value(key);
    resolve_with(&PartialIdentity::default(), "committer", &lookup, None)
}

fn resolve_with<F>(
    declared: &PartialIdentity,
    role: &'static str,
    lookup: &F,
    last_resort: Option<&CommitIdentity>,
) -> Result<CommitIdentity, EngineError>
where
    F: Fn(&str) -> Result<Option<String>, crate::git::GitError>,
{
    let field = |value: &Option<String>, name: &'static str| -> Result<String, EngineError> {
        if let Some(v) = non_blank(value.clone()) {
            return Ok(v);
        }
        for key in [format!("{}.{}", role, name), format!("user.{}", name)] {
            if let Some(v) = non_blank(lookup(&key)?) {
                return Ok(v);
            }
        }
        let fallback = last_resort.map(|id| match name {
            "name" => id.name.clone(),
            _ => id.email.clone(),
        });
        non_blank(fallback).ok_or(EngineError::MissingIdentity { role, field: name })
    };

    Ok(CommitIdentity {
        name: field(&declared.name, "name")?,
        email: field(&declared.email, "email")?,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(
        pairs: &[(&str, &str)],
    ) -> impl Fn(&str) -> Result<Option<String>, crate::git::GitError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| Ok(map.get(key).cloned())
    }

    fn partial(name: Option<&str>, email: Option<&str>) -> PartialIdentity {
        PartialIdentity {
            name: name.map(String::from),
            email: email.map(String::from),
        }
    }

    #[test]
    fn declared_fields_win() {
        let lookup = lookup_from(&[("user.name", "Config"), ("user.email", "c@x")]);
        let id = resolve_with(&partial(Some("Me"), None), "author", &lookup, None).unwrap();
        assert_eq!(id.name, "Me");
        assert_eq!(id.email, "c@x");
    }

    #[test]
    fn role_scoped_config_before_user() {
        let lookup = lookup_from(&[
            ("author.name", "Scoped"),
            ("user.name", "User"),
            ("user.email", "u@x"),
        ]);
        let id = resolve_with(&PartialIdentity::default(), "author", &lookup, None).unwrap();
        assert_eq!(id.name, "Scoped");
        assert_eq!(id.email, "u@x");
    }

    #[test]
    fn missing_email_is_fatal() {
        let lookup = lookup_from(&[("user.name", "Only Name")]);
        let err = resolve_with(&PartialIdentity::default(), "author", &lookup, None).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingIdentity {
                role: "author",
                field: "email"
            }
        ));
    }

    #[test]
    fn blank_values_do_not_count() {
        let lookup = lookup_from(&[("user.name", "  "), ("user.email", "e@x")]);
        let err = resolve_with(&partial(Some(""), None), "author", &lookup, None).unwrap_err();
        assert!(matches!(err, EngineError::MissingIdentity { field: "name", .. }));
    }

    #[test]
    fn partial_committer_falls_back_to_author() {
        let lookup = lookup_from(&[]);
        let author = CommitIdentity {
            name: "A".into(),
            email: "a@x".into(),
        };
        let id = resolve_with(&partial(Some("C"), None), "committer", &lookup, Some(&author))
            .unwrap();
        assert_eq!(id.name, "C");
        assert_eq!(id.email, "a@x");
    }
}
