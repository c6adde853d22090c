//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and writes
//! flow through this interface. No other module should import `git2`.
//!
//! We use the `git2` crate exclusively (no shelling out to the git CLI).
//!
//! # Responsibilities
//!
//! - Repository init, open and clone
//! - Revision resolution and commit reads
//! - Status, staging and commit creation
//! - Tags, branches and remotes
//! - Remote ref listing and push, with credentials and host-key checks
//! - Ordered history walks
//!
//! # Invariants
//!
//! - Library "not found" results that callers branch on come back as
//!   [`Lookup::NotFound`], never as a string-matched error
//! - All operations return strong types (Oid, RefName)
//!
//! # Example
//!
//! ```ignore
//! use gitform::git::{Git, WalkOrder};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.resolve_revision("HEAD")?;
//! for oid in git.walk(&[head], WalkOrder::Time)? {
//!     println!("{}", oid?);
//! }
//! ```

mod interface;
mod transport;
mod walk;

pub use interface::{
    BranchInfo, CloneRequest, CommitDetails, ConfigScope, FileState, Git, GitError, Lookup,
    RefEntry, RemoteInfo, StatusEntry, TagKind,
};
pub use walk::{CommitWalk, WalkOrder};
