//! engine::drift
//!
//! Clone drift detection.
//!
//! A clone is **Stable** while its local HEAD equals the commit the remote
//! advertises for the tracked branch, and **Diverged** once the remote
//! branch points somewhere else. Detection runs at plan time, is read-only,
//! and surfaces the new expected hash so the operator sees it before apply.
//!
//! # Flow
//!
//! ```text
//! open local repo -> read HEAD
//! resolve credentials -> list remote refs (fatal on failure)
//! find tracked branch -> compare
//! ```
//!
//! A tracked branch the remote does not advertise is not drift.

use std::path::Path;

use tracing::debug;

use super::{Context, EngineError};
use crate::auth::{self, AuthSpec};
use crate::core::types::Oid;
use crate::git::{Git, Lookup};

/// Outcome of one detection run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftRecord {
    /// Local HEAD, `None` for an unborn branch.
    pub local_head: Option<Oid>,
    /// What the remote advertises for the tracked branch.
    pub expected: Option<Oid>,
    pub requires_replace: bool,
}

/// The two detector states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftState {
    Stable,
    Diverged { expected: Oid },
}

impl DriftRecord {
    /// Compare a local HEAD against the remote's advertised hash.
    pub fn compare(local_head: Option<Oid>, expected: Option<Oid>) -> Self {
        let requires_replace = match &expected {
            Some(remote) => local_head.as_ref() != Some(remote),
            None => false,
        };
        Self {
            local_head,
            expected,
            requires_replace,
        }
    }

    pub fn state(&self) -> DriftState {
        match (&self.expected, self.requires_replace) {
            (Some(expected), true) => DriftState::Diverged {
                expected: expected.clone(),
            },
            _ => DriftState::Stable,
        }
    }
}

/// Run drift detection for a clone.
///
/// `reference` is the tracked branch ref; `None` uses the context default.
///
/// # Errors
///
/// - [`EngineError::Auth`] when credentials cannot be resolved
/// - [`EngineError::ListRemote`] when the remote cannot be listed
/// - [`EngineError::Git`] when the local repository cannot be read
pub fn detect(
    ctx: &Context,
    directory: &Path,
    url: &str,
    reference: Option<&str>,
    auth_spec: &AuthSpec,
) -> Result<DriftRecord, EngineError> {
    let git = Git::open(directory)?;
    let local_head = git.head_oid()?.found();

    let transport = auth::resolve(auth_spec, &ctx.known_hosts())?;
    let refs = Git::list_remote_refs(url, transport.as_ref()).map_err(|source| {
        EngineError::ListRemote {
            url: url.to_string(),
            source,
        }
    })?;

    let tracked = reference.unwrap_or_else(|| ctx.default_reference());
    let expected = match refs.into_iter().find(|r| r.name == tracked) {
        Some(entry) => Lookup::Found(entry.oid),
        None => Lookup::NotFound,
    };

    let record = DriftRecord::compare(local_head, expected.found());
    debug!(
        directory = %directory.display(),
        reference = tracked,
        diverged = record.requires_replace,
        "clone drift checked"
    );
    Ok(record)
}
