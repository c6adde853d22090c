//! resources::add
//!
//! Staging of working-tree changes.
//!
//! Files are selected by exact path or by glob; only files whose worktree
//! state is not unmodified are considered, and each is staged once.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Resource, ResourceError, ResourceKind};
use crate::core::import_id::ImportId;
use crate::engine::path_matcher::PathMatcher;
use crate::engine::{Context, Reconciliation};
use crate::git::{FileState, Git, StatusEntry};

/// Declared add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSpec {
    pub directory: PathBuf,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub globs: Vec<String>,
}

/// Recorded add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddState {
    pub directory: PathBuf,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub globs: Vec<String>,
    /// Files staged by the last apply.
    #[serde(default)]
    pub added: Vec<String>,
}

impl AddSpec {
    /// Files that would be staged, with their worktree state.
    pub fn selection(&self, git: &Git) -> Result<Vec<(String, FileState)>, ResourceError> {
        let matcher = PathMatcher::new(&self.globs)?;
        let status = git.status()?;
        Ok(select(&self.paths, &matcher, &status))
    }
}

fn select(
    exact: &[String],
    matcher: &PathMatcher,
    status: &[StatusEntry],
) -> Vec<(String, FileState)> {
    let mut seen = HashSet::new();
    let exact_hits = status
        .iter()
        .filter(|e| e.worktree != FileState::Unmodified)
        .filter(|e| exact.iter().any(|p| p == &e.path));

    exact_hits
        .chain(matcher.select(status))
        .filter(|e| seen.insert(e.path.clone()))
        .map(|e| (e.path.clone(), e.worktree))
        .collect()
}

impl Resource for AddSpec {
    type State = AddState;

    const KIND: ResourceKind = ResourceKind::Add;

    fn plan(
        &self,
        ctx: &Context,
        previous: Option<&AddState>,
    ) -> Result<Reconciliation, ResourceError> {
        if self.paths.is_empty() && self.globs.is_empty() {
            return Err(ResourceError::invalid(
                Self::KIND,
                "at least one of paths or globs is required",
            ));
        }
        // Malformed globs fail even before the repository exists.
        PathMatcher::new(&self.globs)?;
        let Some(prev) = previous else {
            return Ok(Reconciliation::Create);
        };
        if prev.directory != self.directory {
            return Ok(Reconciliation::replace("directory changed"));
        }

        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        let pending: Vec<String> = self.selection(&git)?.into_iter().map(|(p, _)| p).collect();
        if !pending.is_empty() {
            return Ok(Reconciliation::Update { changes: pending });
        }
        if prev.paths != self.paths || prev.globs != self.globs {
            return Ok(Reconciliation::Update {
                changes: vec!["selection changed".to_string()],
            });
        }
        Ok(Reconciliation::Noop)
    }

    fn apply(
        &self,
        ctx: &Context,
        _previous: Option<&AddState>,
        _planned: &Reconciliation,
    ) -> Result<AddState, ResourceError> {
        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        let selection = self.selection(&git)?;
        git.stage(&selection)?;
        info!(files = selection.len(), "staged files");

        Ok(AddState {
            directory: self.directory.clone(),
            paths: self.paths.clone(),
            globs: self.globs.clone(),
            added: selection.into_iter().map(|(p, _)| p).collect(),
        })
    }

    fn import(ctx: &Context, id: &str) -> Result<AddState, ResourceError> {
        let id = ImportId::parse_directory(id)?;
        Git::open(&ctx.resolve_dir(&id.directory))?;
        Ok(AddState {
            directory: id.directory,
            paths: Vec::new(),
            globs: Vec::new(),
            added: Vec::new(),
        })
    }
}
