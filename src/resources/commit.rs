//! resources::commit
//!
//! A commit of staged changes.
//!
//! A clean tree is not an error: apply records no hash and plan stays
//! quiet until the working tree changes again.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Resource, ResourceError, ResourceKind};
use crate::core::identity::{PartialIdentity, RecordedSignature};
use crate::core::import_id::ImportId;
use crate::core::types::Oid;
use crate::engine::commit::{self, CommitOutcome, CommitRequest};
use crate::engine::{Context, EngineError, Reconciliation};
use crate::git::{CommitDetails, Git};

/// Declared commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSpec {
    pub directory: PathBuf,
    pub message: String,
    /// Stage tracked modifications and deletions before committing.
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub author: PartialIdentity,
    #[serde(default)]
    pub committer: PartialIdentity,
}

/// Recorded commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitState {
    pub directory: PathBuf,
    pub message: String,
    #[serde(default)]
    pub all: bool,
    /// `None` when the tree was clean and nothing was committed.
    #[serde(default)]
    pub sha1: Option<Oid>,
    #[serde(default)]
    pub author: Option<RecordedSignature>,
    #[serde(default)]
    pub committer: Option<RecordedSignature>,
    #[serde(default)]
    pub files: Vec<String>,
}

impl CommitState {
    fn from_details(directory: PathBuf, all: bool, details: CommitDetails) -> Self {
        Self {
            directory,
            message: details.message,
            all,
            sha1: Some(details.oid),
            author: Some(details.author),
            committer: Some(details.committer),
            files: details.files,
        }
    }
}

impl Resource for CommitSpec {
    type State = CommitState;

    const KIND: ResourceKind = ResourceKind::Commit;

    fn plan(
        &self,
        ctx: &Context,
        previous: Option<&CommitState>,
    ) -> Result<Reconciliation, ResourceError> {
        if self.message.trim().is_empty() {
            return Err(ResourceError::invalid(Self::KIND, "message cannot be empty"));
        }
        let Some(prev) = previous else {
            return Ok(Reconciliation::Create);
        };
        if prev.directory != self.directory {
            return Ok(Reconciliation::replace("directory changed"));
        }

        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        if commit::has_pending_changes(&git, self.all)? {
            return Ok(Reconciliation::replace("working tree changed"));
        }
        Ok(Reconciliation::Noop)
    }

    fn apply(
        &self,
        ctx: &Context,
        _previous: Option<&CommitState>,
        _planned: &Reconciliation,
    ) -> Result<CommitState, ResourceError> {
        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        let request = CommitRequest {
            message: self.message.clone(),
            all: self.all,
            author: self.author.clone(),
            committer: self.committer.clone(),
        };

        Ok(match commit::commit(&git, &request)? {
            CommitOutcome::Clean => CommitState {
                directory: self.directory.clone(),
                message: self.message.clone(),
                all: self.all,
                sha1: None,
                author: None,
                committer: None,
                files: Vec::new(),
            },
            CommitOutcome::Created(details) => {
                CommitState::from_details(self.directory.clone(), self.all, details)
            }
        })
    }

    fn import(ctx: &Context, id: &str) -> Result<CommitState, ResourceError> {
        let id = ImportId::parse_revision(id)?;
        let git = Git::open(&ctx.resolve_dir(&id.directory))?;
        let revision = id.revision.as_deref().unwrap_or("HEAD");
        let oid = git
            .resolve_revision(revision)
            .map_err(EngineError::from_revision)?;
        let details = git.commit_details(&oid)?;
        Ok(CommitState::from_details(id.directory, false, details))
    }
}
