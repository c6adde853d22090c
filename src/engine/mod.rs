//! engine
//!
//! The reconciliation decision layer.
//!
//! # Architecture
//!
//! Every resource is reconciled in two phases:
//!
//! 1. **Plan**: compare the declared configuration with the recorded state
//!    and with the live repository, and decide on a [`Reconciliation`]
//! 2. **Apply**: run the decided operation through the git layer and read
//!    the result back as new recorded state
//!
//! The components in this module hold the decisions that are not simple
//! pass-through calls:
//!
//! - [`log_query`]: turns declarative log inputs into one traversal
//! - [`path_matcher`]: picks the files an add operation touches
//! - [`drift`]: decides whether a clone still tracks its remote branch
//! - [`commit`]: decides whether a commit is needed and builds identities
//! - [`tag`]: resolves tag targets and classifies existing tags
//!
//! Credential resolution lives in [`crate::auth`].
//!
//! # Invariants
//!
//! - All state flows through an explicit [`Context`]; there is no global
//!   "configured" flag
//! - Plan-phase functions never mutate a repository
//! - No operation is retried; every failure is reported once
//!
//! # Example
//!
//! ```ignore
//! use gitform::engine::{Context, log_query::{LogQuery, LogQueryInput}};
//!
//! let ctx = Context::new(project_root, config);
//! let query = LogQuery::build(&git, &LogQueryInput::default())?;
//! let hashes = query.run(&git)?;
//! ```

pub mod commit;
pub mod drift;
pub mod log_query;
pub mod path_matcher;
pub mod plan;
pub mod tag;

pub use plan::{Plan, PlannedResource, Reconciliation};

use std::path::{Path, PathBuf};

use crate::auth::AuthError;
use crate::core::config::Config;
use crate::core::paths::ProjectPaths;
use crate::git::GitError;

/// Explicit initialization context threaded into every plan, apply and
/// import call.
#[derive(Debug, Clone)]
pub struct Context {
    /// Project root; relative resource directories resolve against it.
    pub root: PathBuf,
    /// Loaded tool configuration.
    pub config: Config,
    /// Debug output enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
            debug: false,
            quiet: false,
        }
    }

    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(&self.root)
    }

    /// Resolve a resource directory against the project root.
    pub fn resolve_dir(&self, directory: &Path) -> PathBuf {
        self.paths().resolve(directory)
    }

    /// Known-hosts files for SSH resources that declare none.
    pub fn known_hosts(&self) -> Vec<PathBuf> {
        self.config.known_hosts()
    }

    /// Branch ref compared by clone drift detection when none is declared.
    pub fn default_reference(&self) -> &str {
        self.config.default_reference()
    }
}

/// Errors from the decision components.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A revision did not name a commit.
    #[error("cannot resolve revision '{revision}'")]
    Revision { revision: String },

    /// A time bound was not RFC 3339.
    #[error("invalid {field} timestamp '{value}': {message}")]
    Timestamp {
        field: &'static str,
        value: String,
        message: String,
    },

    /// A glob pattern driving a mutation was malformed.
    #[error("cannot match file path: invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Listing refs of a remote failed.
    #[error("cannot list remote {url}: {source}")]
    ListRemote {
        url: String,
        #[source]
        source: GitError,
    },

    /// An identity was still incomplete after configuration fallback.
    #[error("{role} field is required: no {field} configured")]
    MissingIdentity {
        role: &'static str,
        field: &'static str,
    },

    /// Credential resolution failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Git error.
    #[error(transparent)]
    Git(#[from] GitError),
}

impl EngineError {
    /// Map a revision lookup failure, keeping other git errors intact.
    pub(crate) fn from_revision(err: GitError) -> Self {
        match err {
            GitError::RevisionNotFound { revision } => EngineError::Revision { revision },
            other => EngineError::Git(other),
        }
    }
}
