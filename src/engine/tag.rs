//! engine::tag
//!
//! Tag target resolution, creation, and read-back classification.
//!
//! An explicit SHA1 wins over a revision; with neither, `HEAD` is used.
//! A message makes the tag annotated, its absence lightweight. Reading a tag
//! back loads the object its ref points at: a tag object means annotated,
//! "not found" means lightweight, anything else is an error.

use tracing::info;

use super::commit::resolve_tagger;
use super::EngineError;
use crate::core::types::Oid;
use crate::git::{Git, Lookup, TagKind};

/// A resolved tag: the commit it names and how it is stored.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TagTarget {
    pub hash: Oid,
    pub annotated: bool,
    pub message: Option<String>,
}

/// Resolve the commit a tag should point at.
///
/// # Errors
///
/// [`EngineError::Revision`] when neither input names a commit.
pub fn resolve_target(
    git: &Git,
    sha1: Option<&str>,
    revision: Option<&str>,
) -> Result<Oid, EngineError> {
    let wanted = sha1.or(revision).unwrap_or("HEAD");
    git.resolve_revision(wanted)
        .map_err(EngineError::from_revision)
}

/// Create a tag, annotated when `message` is given.
pub fn create(
    git: &Git,
    name: &str,
    target: &Oid,
    message: Option<&str>,
) -> Result<TagTarget, EngineError> {
    match message {
        Some(msg) => {
            let tagger = resolve_tagger(git)?;
            git.create_tag(name, target, Some((msg, &tagger)))?;
        }
        None => git.create_tag(name, target, None)?,
    }
    info!(tag = name, target = %target.short(7), annotated = message.is_some(), "created tag");

    match read(git, name)? {
        Lookup::Found(t) => Ok(t),
        Lookup::NotFound => Err(EngineError::Git(crate::git::GitError::RefNotFound {
            refname: format!("refs/tags/{}", name),
        })),
    }
}

/// Read an existing tag back, `NotFound` when the ref is absent.
pub fn read(git: &Git, name: &str) -> Result<Lookup<TagTarget>, EngineError> {
    let object = match git.tag_ref_target(name)? {
        Lookup::Found(oid) => oid,
        Lookup::NotFound => return Ok(Lookup::NotFound),
    };

    let (annotated, message) = match git.find_tag_object(&object)? {
        Lookup::Found(TagKind::Annotated { message, .. }) => (true, Some(message)),
        Lookup::Found(TagKind::Lightweight) | Lookup::NotFound => (false, None),
    };

    Ok(Lookup::Found(TagTarget {
        hash: git.peel_tag(name)?,
        annotated,
        message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::CommitIdentity;
    use crate::git::FileState;
    use tempfile::TempDir;

    /// A repository with two commits, oldest first, and a configured user.
    fn history() -> (TempDir, Git, Vec<Oid>) {
        let tmp = TempDir::new().unwrap();
        Git::init(tmp.path(), false, Some("main")).unwrap();
        let config = tmp.path().join(".git/config");
        let mut contents = std::fs::read_to_string(&config).unwrap();
        contents.push_str("[user]\n\tname = Tagger\n\temail = tagger@example.com\n");
        std::fs::write(&config, contents).unwrap();

        let git = Git::open(tmp.path()).unwrap();
        let who = CommitIdentity {
            name: "Tester".into(),
            email: "tester@example.com".into(),
        };
        let mut commits = Vec::new();
        for (file, message) in [("a.txt", "first"), ("b.txt", "second")] {
            std::fs::write(tmp.path().join(file), message).unwrap();
            git.stage(&[(file.to_string(), FileState::Untracked)]).unwrap();
            commits.push(git.create_commit(message, &who, &who).unwrap());
        }
        (tmp, git, commits)
    }

    mod target {
        use super::*;

        #[test]
        fn head_when_nothing_declared() {
            let (_tmp, git, commits) = history();
            assert_eq!(resolve_target(&git, None, None).unwrap(), commits[1]);
        }

        #[test]
        fn revision_when_no_sha1() {
            let (_tmp, git, commits) = history();
            assert_eq!(resolve_target(&git, None, Some("HEAD~1")).unwrap(), commits[0]);
        }

        #[test]
        fn sha1_wins_over_revision() {
            let (_tmp, git, commits) = history();
            let target = resolve_target(&git, Some(commits[0].as_str()), Some("HEAD")).unwrap();
            assert_eq!(target, commits[0]);
        }

        #[test]
        fn unknown_sha1_is_a_revision_error() {
            let (_tmp, git, _) = history();
            let missing = "1".repeat(40);
            let err = resolve_target(&git, Some(&missing), Some("HEAD")).unwrap_err();
            assert!(matches!(err, EngineError::Revision { ref revision } if *revision == missing));
        }

        #[test]
        fn unknown_revision_is_a_revision_error() {
            let (_tmp, git, _) = history();
            let err = resolve_target(&git, None, Some("no-such-branch")).unwrap_err();
            assert_eq!(err.to_string(), "cannot resolve revision 'no-such-branch'");
        }
    }

    mod read_back {
        use super::*;

        #[test]
        fn annotated_tag_keeps_message() {
            let (_tmp, git, commits) = history();
            let created = create(&git, "v1", &commits[0], Some("release one")).unwrap();
            assert!(created.annotated);
            assert_eq!(created.hash, commits[0]);
            assert_eq!(created.message.as_deref().map(str::trim_end), Some("release one"));
            assert_eq!(read(&git, "v1").unwrap(), Lookup::Found(created));
        }

        #[test]
        fn lightweight_tag_has_no_message() {
            let (_tmp, git, commits) = history();
            let created = create(&git, "light", &commits[1], None).unwrap();
            assert!(!created.annotated);
            assert_eq!(created.message, None);
            assert_eq!(created.hash, commits[1]);
        }

        #[test]
        fn absent_tag_is_not_found() {
            let (_tmp, git, _) = history();
            assert_eq!(read(&git, "missing").unwrap(), Lookup::NotFound);
        }
    }
}
