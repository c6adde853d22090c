//! resources::remote
//!
//! A named remote and its URLs.
//!
//! URL changes are applied in place; renaming a remote recreates it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Resource, ResourceError, ResourceKind};
use crate::core::import_id::ImportId;
use crate::engine::{Context, Reconciliation};
use crate::git::{Git, GitError, Lookup};

/// Declared remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSpec {
    pub directory: PathBuf,
    pub name: String,
    pub urls: Vec<String>,
}

/// Recorded remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteState {
    pub directory: PathBuf,
    pub name: String,
    pub urls: Vec<String>,
}

impl RemoteSpec {
    fn validate(&self) -> Result<(), ResourceError> {
        if self.name.trim().is_empty() {
            return Err(ResourceError::invalid(Self::KIND, "name cannot be empty"));
        }
        if self.urls.is_empty() || self.urls.iter().any(|u| u.trim().is_empty()) {
            return Err(ResourceError::invalid(
                Self::KIND,
                "at least one non-empty url is required",
            ));
        }
        Ok(())
    }

    fn state(&self) -> RemoteState {
        RemoteState {
            directory: self.directory.clone(),
            name: self.name.clone(),
            urls: self.urls.clone(),
        }
    }
}

impl Resource for RemoteSpec {
    type State = RemoteState;

    const KIND: ResourceKind = ResourceKind::Remote;

    fn plan(
        &self,
        ctx: &Context,
        previous: Option<&RemoteState>,
    ) -> Result<Reconciliation, ResourceError> {
        self.validate()?;
        let Some(prev) = previous else {
            return Ok(Reconciliation::Create);
        };
        if prev.directory != self.directory {
            return Ok(Reconciliation::replace("directory changed"));
        }
        if prev.name != self.name {
            return Ok(Reconciliation::replace("name changed"));
        }

        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        Ok(match git.remote_urls(&self.name)? {
            Lookup::NotFound => Reconciliation::Create,
            Lookup::Found(urls) if urls != self.urls => Reconciliation::Update {
                changes: vec![format!("urls: [{}] -> [{}]", urls.join(", "), self.urls.join(", "))],
            },
            Lookup::Found(_) => Reconciliation::Noop,
        })
    }

    fn apply(
        &self,
        ctx: &Context,
        previous: Option<&RemoteState>,
        planned: &Reconciliation,
    ) -> Result<RemoteState, ResourceError> {
        self.validate()?;

        if let (Reconciliation::Replace { .. }, Some(prev)) = (planned, previous) {
            if let Ok(old) = Git::open(&ctx.resolve_dir(&prev.directory)) {
                if old.remote_urls(&prev.name)?.is_found() {
                    old.delete_remote(&prev.name)?;
                }
            }
        }

        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        if git.remote_urls(&self.name)?.is_found() {
            git.set_remote_urls(&self.name, &self.urls)?;
        } else {
            git.create_remote(&self.name, &self.urls)?;
        }
        info!(remote = %self.name, urls = self.urls.len(), "remote configured");
        Ok(self.state())
    }

    fn import(ctx: &Context, id: &str) -> Result<RemoteState, ResourceError> {
        let id = ImportId::parse_named(id)?;
        let name = id.name.unwrap_or_default();
        let git = Git::open(&ctx.resolve_dir(&id.directory))?;
        let urls = git
            .remote_urls(&name)?
            .found()
            .ok_or_else(|| GitError::RemoteNotFound { name: name.clone() })?;
        Ok(RemoteState {
            directory: id.directory,
            name,
            urls,
        })
    }
}
