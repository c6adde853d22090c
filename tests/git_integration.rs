//! Integration tests for the Git interface.
//!
//! These tests use real git repositories created via tempfile to verify
//! that the Git interface works correctly with actual git operations.

mod common;

use common::{advance_remote, TestRepo};
use tempfile::TempDir;

use gitform::core::identity::CommitIdentity;
use gitform::git::{FileState, Git, GitError, Lookup, TagKind, WalkOrder};

fn identity() -> CommitIdentity {
    CommitIdentity {
        name: "Test User".into(),
        email: "test@example.com".into(),
    }
}

// =============================================================================
// Opening and init
// =============================================================================

#[test]
fn open_non_repository_fails() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Git::open(dir.path()),
        Err(GitError::NotARepo { .. })
    ));
    assert!(!Git::is_repository(dir.path()));
}

#[test]
fn init_with_initial_branch() {
    let dir = TempDir::new().unwrap();
    let git = Git::init(&dir.path().join("fresh"), false, Some("trunk")).unwrap();
    assert_eq!(git.head_oid().unwrap(), Lookup::NotFound);
    assert_eq!(
        git.head_ref_name().unwrap().as_deref(),
        Some("refs/heads/trunk")
    );
}

#[test]
fn init_bare() {
    let dir = TempDir::new().unwrap();
    let git = Git::init(&dir.path().join("bare.git"), true, None).unwrap();
    assert!(git.is_bare());
    assert!(git.workdir().is_none());
}

// =============================================================================
// Revisions
// =============================================================================

#[test]
fn resolve_revision_matches_cli() {
    let repo = TestRepo::new();
    let head = repo.head();
    assert_eq!(repo.git().resolve_revision("HEAD").unwrap(), head);
    assert_eq!(repo.git().resolve_revision("main").unwrap(), head);
}

#[test]
fn unknown_revision_is_typed() {
    let repo = TestRepo::new();
    assert!(matches!(
        repo.git().resolve_revision("does-not-exist"),
        Err(GitError::RevisionNotFound { .. })
    ));
}

// =============================================================================
// Status, staging and commits
// =============================================================================

#[test]
fn status_classifies_files() {
    let repo = TestRepo::new();
    repo.write("README.md", "changed\n");
    repo.write("new.txt", "new\n");

    let status = repo.git().status().unwrap();
    let find = |p: &str| status.iter().find(|e| e.path == p).unwrap().clone();

    assert_eq!(find("README.md").worktree, FileState::Modified);
    assert_eq!(find("new.txt").worktree, FileState::Untracked);
    assert!(!find("new.txt").is_staged());
}

#[test]
fn stage_and_commit_reads_back_files() {
    let repo = TestRepo::new();
    let parent = repo.head();
    repo.write("a.txt", "a\n");
    std::fs::remove_file(repo.path().join("README.md")).unwrap();

    let git = repo.git();
    git.stage(&[
        ("a.txt".to_string(), FileState::Untracked),
        ("README.md".to_string(), FileState::Deleted),
    ])
    .unwrap();

    let oid = git
        .create_commit("second\n", &identity(), &identity())
        .unwrap();
    let details = git.commit_details(&oid).unwrap();

    assert_eq!(details.parents, vec![parent]);
    assert_eq!(details.files, vec!["README.md".to_string(), "a.txt".to_string()]);
    assert_eq!(details.author.email, "test@example.com");
    assert_eq!(repo.head(), oid);
}

#[test]
fn root_commit_diffs_against_empty_tree() {
    let repo = TestRepo::new();
    let details = repo.git().commit_details(&repo.head()).unwrap();
    assert!(details.parents.is_empty());
    assert_eq!(details.files, vec!["README.md".to_string()]);
}

// =============================================================================
// Tags
// =============================================================================

#[test]
fn lightweight_tag_has_no_tag_object() {
    let repo = TestRepo::new();
    repo.git_cmd(&["tag", "light"]);

    let git = repo.git();
    let target = git.tag_ref_target("light").unwrap().found().unwrap();
    assert_eq!(git.find_tag_object(&target).unwrap(), Lookup::NotFound);
    assert_eq!(git.peel_tag("light").unwrap(), repo.head());
}

#[test]
fn annotated_tag_carries_message() {
    let repo = TestRepo::new();
    repo.git_cmd(&["tag", "-a", "heavy", "-m", "release notes"]);

    let git = repo.git();
    let target = git.tag_ref_target("heavy").unwrap().found().unwrap();
    match git.find_tag_object(&target).unwrap() {
        Lookup::Found(TagKind::Annotated { message, .. }) => {
            assert_eq!(message.trim_end(), "release notes")
        }
        other => panic!("expected annotated tag, got {:?}", other),
    }
    assert_eq!(git.peel_tag("heavy").unwrap(), repo.head());
}

#[test]
fn missing_tag_is_not_found() {
    let repo = TestRepo::new();
    assert_eq!(repo.git().tag_ref_target("nope").unwrap(), Lookup::NotFound);
}

// =============================================================================
// Remotes
// =============================================================================

#[test]
fn remote_with_several_urls() {
    let repo = TestRepo::new();
    let git = repo.git();
    let urls = vec![
        "https://example.com/a.git".to_string(),
        "https://mirror.example.com/a.git".to_string(),
    ];
    git.create_remote("origin", &urls).unwrap();
    assert_eq!(git.remote_urls("origin").unwrap(), Lookup::Found(urls));

    let replaced = vec!["https://example.com/b.git".to_string()];
    git.set_remote_urls("origin", &replaced).unwrap();
    assert_eq!(git.remote_urls("origin").unwrap(), Lookup::Found(replaced));

    git.delete_remote("origin").unwrap();
    assert_eq!(git.remote_urls("origin").unwrap(), Lookup::NotFound);
}

#[test]
fn list_remote_refs_of_local_bare_repository() {
    let repo = TestRepo::new();
    let remote = repo.bare_remote();
    let moved = advance_remote(&remote, "remote.txt");

    let refs = Git::list_remote_refs(&remote.to_string_lossy(), None).unwrap();
    let main = refs.iter().find(|r| r.name == "refs/heads/main").unwrap();
    assert_eq!(main.oid, moved);
}

#[test]
fn listing_unreachable_remote_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.git");
    assert!(matches!(
        Git::list_remote_refs(&missing.to_string_lossy(), None),
        Err(GitError::Remote { .. })
    ));
}

#[test]
fn push_updates_bare_remote() {
    let repo = TestRepo::new();
    let remote = repo.bare_remote();
    let head = repo.commit_file("b.txt", "b\n", "second");

    repo.git()
        .push("origin", &["refs/heads/main:refs/heads/main".to_string()], None)
        .unwrap();

    let remote_git = Git::open(&remote).unwrap();
    assert_eq!(
        remote_git.try_resolve_ref("refs/heads/main").unwrap(),
        Lookup::Found(head)
    );
}

// =============================================================================
// Walks
// =============================================================================

#[test]
fn walk_orders_cover_history_once() {
    let repo = TestRepo::new();
    let first = repo.head();
    let second = repo.commit_file("a.txt", "a\n", "second");
    let third = repo.commit_file("b.txt", "b\n", "third");

    for order in [WalkOrder::Time, WalkOrder::DepthFirst, WalkOrder::BreadthFirst] {
        let walked: Vec<_> = repo
            .git()
            .walk(&[third.clone()], order)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(walked, vec![third.clone(), second.clone(), first.clone()]);
    }
}
