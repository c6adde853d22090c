//! resources
//!
//! Managed entities and their three verbs: plan, apply, import.
//!
//! # Architecture
//!
//! Each resource kind lives in its own module with a declared form
//! (`*Spec`, parsed from the manifest) and a recorded form (`*State`,
//! stored in the state file). Both implement the shared [`Resource`]
//! contract:
//!
//! - `plan(ctx, previous)` decides on a [`Reconciliation`] without mutating
//!   anything
//! - `apply(ctx, previous, planned)` runs the decided operation and returns
//!   new recorded state read back from the repository
//! - `import(ctx, id)` builds recorded state for an existing object
//!
//! [`ResourceSpec`] and [`ResourceState`] close the set of kinds so the
//! manifest and state file can hold any of them.

pub mod add;
pub mod clone;
pub mod commit;
pub mod manifest;
pub mod push;
pub mod remote;
pub mod repository;
pub mod state;
pub mod tag;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::auth::AuthError;
use crate::core::import_id::ImportIdError;
use crate::engine::{Context, EngineError, Reconciliation};
use crate::git::GitError;

/// Errors from resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    ImportId(#[from] ImportIdError),

    /// Declared configuration is unusable.
    #[error("invalid {kind} resource: {message}")]
    Invalid { kind: ResourceKind, message: String },

    #[error("failed to remove '{path}': {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unknown resource type '{0}'")]
    UnknownKind(String),
}

impl ResourceError {
    pub(crate) fn invalid(kind: ResourceKind, message: impl Into<String>) -> Self {
        ResourceError::Invalid {
            kind,
            message: message.into(),
        }
    }
}

/// The plan/apply/import contract every resource kind implements.
pub trait Resource {
    /// Recorded form.
    type State;

    const KIND: ResourceKind;

    /// Decide what is needed to make the repository match the declaration.
    ///
    /// Must not mutate any repository.
    fn plan(
        &self,
        ctx: &Context,
        previous: Option<&Self::State>,
    ) -> Result<Reconciliation, ResourceError>;

    /// Execute a non-noop plan and return the new recorded state.
    fn apply(
        &self,
        ctx: &Context,
        previous: Option<&Self::State>,
        planned: &Reconciliation,
    ) -> Result<Self::State, ResourceError>;

    /// Build recorded state for an existing object.
    fn import(ctx: &Context, id: &str) -> Result<Self::State, ResourceError>;
}

/// Resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Repository,
    Clone,
    Add,
    Commit,
    Tag,
    Remote,
    Push,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Repository,
        ResourceKind::Clone,
        ResourceKind::Add,
        ResourceKind::Commit,
        ResourceKind::Tag,
        ResourceKind::Remote,
        ResourceKind::Push,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Repository => "repository",
            ResourceKind::Clone => "clone",
            ResourceKind::Add => "add",
            ResourceKind::Commit => "commit",
            ResourceKind::Tag => "tag",
            ResourceKind::Remote => "remote",
            ResourceKind::Push => "push",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ResourceError::UnknownKind(s.to_string()))
    }
}

/// A declared resource of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceSpec {
    Repository(repository::RepositorySpec),
    Clone(clone::CloneSpec),
    Add(add::AddSpec),
    Commit(commit::CommitSpec),
    Tag(tag::TagSpec),
    Remote(remote::RemoteSpec),
    Push(push::PushSpec),
}

/// Recorded state of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceState {
    Repository(repository::RepositoryState),
    Clone(clone::CloneState),
    Add(add::AddState),
    Commit(commit::CommitState),
    Tag(tag::TagState),
    Remote(remote::RemoteState),
    Push(push::PushState),
}

impl ResourceState {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceState::Repository(_) => ResourceKind::Repository,
            ResourceState::Clone(_) => ResourceKind::Clone,
            ResourceState::Add(_) => ResourceKind::Add,
            ResourceState::Commit(_) => ResourceKind::Commit,
            ResourceState::Tag(_) => ResourceKind::Tag,
            ResourceState::Remote(_) => ResourceKind::Remote,
            ResourceState::Push(_) => ResourceKind::Push,
        }
    }
}

/// Pick the recorded state matching a spec's kind; other kinds count as absent.
macro_rules! previous_as {
    ($previous:expr, $variant:ident) => {
        match $previous {
            Some(ResourceState::$variant(state)) => Some(state),
            _ => None,
        }
    };
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Repository(_) => ResourceKind::Repository,
            ResourceSpec::Clone(_) => ResourceKind::Clone,
            ResourceSpec::Add(_) => ResourceKind::Add,
            ResourceSpec::Commit(_) => ResourceKind::Commit,
            ResourceSpec::Tag(_) => ResourceKind::Tag,
            ResourceSpec::Remote(_) => ResourceKind::Remote,
            ResourceSpec::Push(_) => ResourceKind::Push,
        }
    }

    /// Plan this resource against its recorded state.
    pub fn plan(
        &self,
        ctx: &Context,
        previous: Option<&ResourceState>,
    ) -> Result<Reconciliation, ResourceError> {
        match self {
            ResourceSpec::Repository(s) => s.plan(ctx, previous_as!(previous, Repository)),
            ResourceSpec::Clone(s) => s.plan(ctx, previous_as!(previous, Clone)),
            ResourceSpec::Add(s) => s.plan(ctx, previous_as!(previous, Add)),
            ResourceSpec::Commit(s) => s.plan(ctx, previous_as!(previous, Commit)),
            ResourceSpec::Tag(s) => s.plan(ctx, previous_as!(previous, Tag)),
            ResourceSpec::Remote(s) => s.plan(ctx, previous_as!(previous, Remote)),
            ResourceSpec::Push(s) => s.plan(ctx, previous_as!(previous, Push)),
        }
    }

    /// Apply a planned action.
    ///
    /// A `Noop` returns the recorded state unchanged when there is one.
    pub fn apply(
        &self,
        ctx: &Context,
        previous: Option<&ResourceState>,
        planned: &Reconciliation,
    ) -> Result<ResourceState, ResourceError> {
        if planned.is_noop() {
            if let Some(state) = previous.filter(|p| p.kind() == self.kind()) {
                return Ok(state.clone());
            }
        }
        Ok(match self {
            ResourceSpec::Repository(s) => ResourceState::Repository(s.apply(
                ctx,
                previous_as!(previous, Repository),
                planned,
            )?),
            ResourceSpec::Clone(s) => {
                ResourceState::Clone(s.apply(ctx, previous_as!(previous, Clone), planned)?)
            }
            ResourceSpec::Add(s) => {
                ResourceState::Add(s.apply(ctx, previous_as!(previous, Add), planned)?)
            }
            ResourceSpec::Commit(s) => {
                ResourceState::Commit(s.apply(ctx, previous_as!(previous, Commit), planned)?)
            }
            ResourceSpec::Tag(s) => {
                ResourceState::Tag(s.apply(ctx, previous_as!(previous, Tag), planned)?)
            }
            ResourceSpec::Remote(s) => {
                ResourceState::Remote(s.apply(ctx, previous_as!(previous, Remote), planned)?)
            }
            ResourceSpec::Push(s) => {
                ResourceState::Push(s.apply(ctx, previous_as!(previous, Push), planned)?)
            }
        })
    }
}

/// Remove a directory left by an earlier apply, if it is still there.
pub(crate) fn remove_dir(path: &Path) -> Result<(), ResourceError> {
    if !path.exists() {
        return Ok(());
    }
    fs::remove_dir_all(path).map_err(|source| ResourceError::Remove {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "removed previous directory");
    Ok(())
}

/// Import an existing object of `kind` identified by `id`.
pub fn import(ctx: &Context, kind: ResourceKind, id: &str) -> Result<ResourceState, ResourceError> {
    Ok(match kind {
        ResourceKind::Repository => {
            ResourceState::Repository(repository::RepositorySpec::import(ctx, id)?)
        }
        ResourceKind::Clone => ResourceState::Clone(clone::CloneSpec::import(ctx, id)?),
        ResourceKind::Add => ResourceState::Add(add::AddSpec::import(ctx, id)?),
        ResourceKind::Commit => ResourceState::Commit(commit::CommitSpec::import(ctx, id)?),
        ResourceKind::Tag => ResourceState::Tag(tag::TagSpec::import(ctx, id)?),
        ResourceKind::Remote => ResourceState::Remote(remote::RemoteSpec::import(ctx, id)?),
        ResourceKind::Push => ResourceState::Push(push::PushSpec::import(ctx, id)?),
    })
}
