//! resources::clone
//!
//! A local clone of a remote repository.
//!
//! Planning compares declared inputs first; when they are unchanged the
//! drift detector decides whether the remote branch moved past local HEAD.
//! A diverged clone is replaced: the recorded directory is removed and the
//! repository cloned again.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{remove_dir, Resource, ResourceError, ResourceKind};
use crate::auth::{self, AuthConfig};
use crate::core::import_id::ImportId;
use crate::core::types::{Oid, RefName};
use crate::engine::drift::{self, DriftState};
use crate::engine::{Context, Reconciliation};
use crate::git::{CloneRequest, Git, Lookup};

/// Declared clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneSpec {
    pub directory: PathBuf,
    pub url: String,
    /// Branch ref to check out and track, e.g. `refs/heads/main`.
    ///
    /// Falls back to the configured default reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub bare: bool,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Recorded clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneState {
    pub directory: PathBuf,
    pub url: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub bare: bool,
    #[serde(default)]
    pub head: Option<Oid>,
}

impl CloneSpec {
    fn validate(&self) -> Result<Option<RefName>, ResourceError> {
        if self.url.trim().is_empty() {
            return Err(ResourceError::invalid(Self::KIND, "url cannot be empty"));
        }
        let Some(reference) = &self.reference else {
            return Ok(None);
        };
        let parsed = RefName::new(reference.as_str())
            .map_err(|e| ResourceError::invalid(Self::KIND, e.to_string()))?;
        if !parsed.is_branch_ref() {
            return Err(ResourceError::invalid(
                Self::KIND,
                format!("reference must be a branch ref, got '{}'", reference),
            ));
        }
        Ok(Some(parsed))
    }

    fn changed_inputs(&self, prev: &CloneState) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if prev.directory != self.directory {
            changed.push("directory");
        }
        if prev.url != self.url {
            changed.push("url");
        }
        if prev.reference != self.reference {
            changed.push("reference");
        }
        if prev.bare != self.bare {
            changed.push("bare");
        }
        changed
    }
}

impl Resource for CloneSpec {
    type State = CloneState;

    const KIND: ResourceKind = ResourceKind::Clone;

    fn plan(
        &self,
        ctx: &Context,
        previous: Option<&CloneState>,
    ) -> Result<Reconciliation, ResourceError> {
        self.validate()?;
        let auth_spec = self.auth.to_spec()?;
        let Some(prev) = previous else {
            return Ok(Reconciliation::Create);
        };

        let changed = self.changed_inputs(prev);
        if !changed.is_empty() {
            return Ok(Reconciliation::Replace {
                reason: "configuration changed".to_string(),
                detail: Some(changed.join(", ")),
            });
        }

        let path = ctx.resolve_dir(&self.directory);
        if !Git::is_repository(&path) {
            return Ok(Reconciliation::replace("clone directory missing"));
        }

        let record = drift::detect(
            ctx,
            &path,
            &self.url,
            self.reference.as_deref(),
            &auth_spec,
        )?;
        Ok(match record.state() {
            DriftState::Stable => Reconciliation::Noop,
            DriftState::Diverged { expected } => Reconciliation::Replace {
                reason: "remote branch moved".to_string(),
                detail: Some(expected.to_string()),
            },
        })
    }

    fn apply(
        &self,
        ctx: &Context,
        previous: Option<&CloneState>,
        _planned: &Reconciliation,
    ) -> Result<CloneState, ResourceError> {
        // Check out the same branch drift detection will compare against.
        let reference = match self.validate()? {
            Some(reference) => reference,
            None => RefName::new(ctx.default_reference())
                .map_err(|e| ResourceError::invalid(Self::KIND, e.to_string()))?,
        };
        let transport = auth::resolve(&self.auth.to_spec()?, &ctx.known_hosts())?;

        if let Some(prev) = previous {
            remove_dir(&ctx.resolve_dir(&prev.directory))?;
        }
        let path = ctx.resolve_dir(&self.directory);

        let request = CloneRequest {
            reference: Some(reference),
            bare: self.bare,
        };
        let git = Git::clone(&self.url, &path, &request, transport.as_ref())?;
        let head = git.head_oid()?.found();
        info!(url = %self.url, path = %path.display(), "cloned");

        Ok(CloneState {
            directory: self.directory.clone(),
            url: self.url.clone(),
            reference: self.reference.clone(),
            bare: self.bare,
            head,
        })
    }

    fn import(ctx: &Context, id: &str) -> Result<CloneState, ResourceError> {
        let id = ImportId::parse_directory(id)?;
        let git = Git::open(&ctx.resolve_dir(&id.directory))?;

        let url = match git.remote_urls("origin")? {
            Lookup::Found(urls) => urls.into_iter().next().unwrap_or_default(),
            Lookup::NotFound => {
                return Err(crate::git::GitError::RemoteNotFound {
                    name: "origin".to_string(),
                }
                .into())
            }
        };

        Ok(CloneState {
            directory: id.directory,
            url,
            reference: git.head_ref_name()?,
            bare: git.is_bare(),
            head: git.head_oid()?.found(),
        })
    }
}
