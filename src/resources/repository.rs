//! resources::repository
//!
//! An initialized repository.
//!
//! Re-applying over an existing repository is harmless: init reopens it.
//! Changing the directory, the bare flag or a declared initial branch
//! recreates the repository: the recorded directory is removed first.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{remove_dir, Resource, ResourceError, ResourceKind};
use crate::core::import_id::ImportId;
use crate::core::types::{Oid, RefName};
use crate::engine::{Context, Reconciliation};
use crate::git::Git;

/// Declared repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySpec {
    pub directory: PathBuf,
    #[serde(default)]
    pub bare: bool,
    /// Branch HEAD points at after init, e.g. `main`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_branch: Option<String>,
}

/// Recorded repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryState {
    pub directory: PathBuf,
    pub bare: bool,
    #[serde(default)]
    pub initial_branch: Option<String>,
    /// HEAD commit at apply time, `None` while unborn.
    #[serde(default)]
    pub head: Option<Oid>,
}

impl RepositorySpec {
    fn validate(&self) -> Result<(), ResourceError> {
        if let Some(branch) = &self.initial_branch {
            RefName::for_branch(branch)
                .map_err(|e| ResourceError::invalid(Self::KIND, e.to_string()))?;
        }
        Ok(())
    }

    /// Why the recorded repository cannot be kept, if it cannot.
    ///
    /// An undeclared initial branch accepts whatever branch HEAD names.
    fn recreate_reason(&self, prev: &RepositoryState) -> Option<&'static str> {
        if prev.directory != self.directory {
            Some("directory changed")
        } else if prev.bare != self.bare {
            Some("bare changed")
        } else if self.initial_branch.is_some() && prev.initial_branch != self.initial_branch {
            Some("initial branch changed")
        } else {
            None
        }
    }
}

/// Short name of the branch HEAD points at, born or not.
fn head_branch(git: &Git) -> Result<Option<String>, ResourceError> {
    Ok(git
        .head_ref_name()?
        .and_then(|name| name.strip_prefix("refs/heads/").map(String::from)))
}

impl Resource for RepositorySpec {
    type State = RepositoryState;

    const KIND: ResourceKind = ResourceKind::Repository;

    fn plan(
        &self,
        ctx: &Context,
        previous: Option<&RepositoryState>,
    ) -> Result<Reconciliation, ResourceError> {
        self.validate()?;
        let Some(prev) = previous else {
            return Ok(Reconciliation::Create);
        };

        if let Some(reason) = self.recreate_reason(prev) {
            return Ok(Reconciliation::replace(reason));
        }
        if !Git::is_repository(&ctx.resolve_dir(&self.directory)) {
            return Ok(Reconciliation::replace("repository missing"));
        }
        Ok(Reconciliation::Noop)
    }

    fn apply(
        &self,
        ctx: &Context,
        previous: Option<&RepositoryState>,
        _planned: &Reconciliation,
    ) -> Result<RepositoryState, ResourceError> {
        self.validate()?;
        if let Some(prev) = previous {
            if let Some(reason) = self.recreate_reason(prev) {
                info!(reason, "recreating repository");
                remove_dir(&ctx.resolve_dir(&prev.directory))?;
            }
        }

        let path = ctx.resolve_dir(&self.directory);
        let git = Git::init(&path, self.bare, self.initial_branch.as_deref())?;
        info!(path = %path.display(), "repository ready");

        Ok(RepositoryState {
            directory: self.directory.clone(),
            bare: self.bare,
            initial_branch: head_branch(&git)?,
            head: git.head_oid()?.found(),
        })
    }

    fn import(ctx: &Context, id: &str) -> Result<RepositoryState, ResourceError> {
        let id = ImportId::parse_directory(id)?;
        let git = Git::open(&ctx.resolve_dir(&id.directory))?;
        Ok(RepositoryState {
            directory: id.directory,
            bare: git.is_bare(),
            initial_branch: head_branch(&git)?,
            head: git.head_oid()?.found(),
        })
    }
}
