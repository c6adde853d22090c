//! resources::tag
//!
//! An annotated or lightweight tag.
//!
//! Declared inputs that change, a tag that disappeared, or a tag that was
//! moved outside gitform all force the tag to be recreated.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Resource, ResourceError, ResourceKind};
use crate::core::import_id::ImportId;
use crate::core::types::{Oid, RefName};
use crate::engine::tag::{self, TagTarget};
use crate::engine::{Context, Reconciliation};
use crate::git::{Git, GitError, Lookup};

/// Declared tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpec {
    pub directory: PathBuf,
    pub name: String,
    /// Revision to tag; `HEAD` when neither this nor `sha1` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Explicit target; wins over `revision`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    /// Makes the tag annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Recorded tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagState {
    pub directory: PathBuf,
    pub name: String,
    #[serde(default)]
    pub revision: Option<String>,
    /// The declared explicit target, if any.
    #[serde(default)]
    pub requested_sha1: Option<String>,
    /// Commit the tag points at.
    pub sha1: Oid,
    pub annotated: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl TagSpec {
    fn validate(&self) -> Result<(), ResourceError> {
        RefName::for_tag(&self.name)
            .map_err(|e| ResourceError::invalid(Self::KIND, e.to_string()))?;
        Ok(())
    }

    /// Unset revisions mean `HEAD`; messages compare without trailing newlines.
    fn inputs_changed(&self, prev: &TagState) -> bool {
        let revision = |r: &Option<String>| r.clone().unwrap_or_else(|| "HEAD".to_string());
        let message = |m: &Option<String>| m.as_deref().map(|s| s.trim_end().to_string());

        prev.directory != self.directory
            || prev.name != self.name
            || revision(&prev.revision) != revision(&self.revision)
            || prev.requested_sha1 != self.sha1
            || message(&prev.message) != message(&self.message)
    }

    fn state(&self, target: TagTarget) -> TagState {
        TagState {
            directory: self.directory.clone(),
            name: self.name.clone(),
            revision: self.revision.clone(),
            requested_sha1: self.sha1.clone(),
            sha1: target.hash,
            annotated: target.annotated,
            message: target.message,
        }
    }
}

impl Resource for TagSpec {
    type State = TagState;

    const KIND: ResourceKind = ResourceKind::Tag;

    fn plan(
        &self,
        ctx: &Context,
        previous: Option<&TagState>,
    ) -> Result<Reconciliation, ResourceError> {
        self.validate()?;
        let Some(prev) = previous else {
            return Ok(Reconciliation::Create);
        };
        if self.inputs_changed(prev) {
            return Ok(Reconciliation::replace("configuration changed"));
        }

        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        Ok(match tag::read(&git, &self.name)? {
            Lookup::NotFound => Reconciliation::replace("tag missing"),
            Lookup::Found(current) if current.hash != prev.sha1 => Reconciliation::Replace {
                reason: "tag moved".to_string(),
                detail: Some(current.hash.to_string()),
            },
            Lookup::Found(_) => Reconciliation::Noop,
        })
    }

    fn apply(
        &self,
        ctx: &Context,
        previous: Option<&TagState>,
        _planned: &Reconciliation,
    ) -> Result<TagState, ResourceError> {
        self.validate()?;
        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        // Nothing is deleted until the new target is known to exist.
        let target = tag::resolve_target(&git, self.sha1.as_deref(), self.revision.as_deref())?;

        if let Some(prev) = previous {
            delete_if_present(&ctx.resolve_dir(&prev.directory), &prev.name)?;
        }
        if git.tag_ref_target(&self.name)?.is_found() {
            git.delete_tag(&self.name)?;
        }
        let created = tag::create(&git, &self.name, &target, self.message.as_deref())?;
        Ok(self.state(created))
    }

    fn import(ctx: &Context, id: &str) -> Result<TagState, ResourceError> {
        let id = ImportId::parse_tag(id)?;
        let name = id.name.unwrap_or_default();
        let git = Git::open(&ctx.resolve_dir(&id.directory))?;

        let target = match tag::read(&git, &name)? {
            Lookup::Found(t) => t,
            Lookup::NotFound => {
                return Err(GitError::RefNotFound {
                    refname: format!("refs/tags/{}", name),
                }
                .into())
            }
        };
        Ok(TagState {
            directory: id.directory,
            name,
            revision: id.revision,
            requested_sha1: None,
            sha1: target.hash,
            annotated: target.annotated,
            message: target.message,
        })
    }
}

fn delete_if_present(directory: &std::path::Path, name: &str) -> Result<(), ResourceError> {
    let Ok(git) = Git::open(directory) else {
        return Ok(());
    };
    if git.tag_ref_target(name)?.is_found() {
        git.delete_tag(name)?;
        info!(tag = name, "removed previous tag");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> TagSpec {
        TagSpec {
            directory: PathBuf::from("repo"),
            name: "v1".into(),
            revision: None,
            sha1: None,
            message: Some("release".into()),
        }
    }

    fn state() -> TagState {
        TagState {
            directory: PathBuf::from("repo"),
            name: "v1".into(),
            revision: Some("HEAD".into()),
            requested_sha1: None,
            sha1: Oid::new("a".repeat(40)).unwrap(),
            annotated: true,
            message: Some("release\n".into()),
        }
    }

    #[test]
    fn head_and_unset_revision_are_equal() {
        assert!(!spec().inputs_changed(&state()));
    }

    #[test]
    fn message_change_detected() {
        let mut s = spec();
        s.message = None;
        assert!(s.inputs_changed(&state()));
    }

    #[test]
    fn explicit_sha1_change_detected() {
        let mut s = spec();
        s.sha1 = Some("b".repeat(40));
        assert!(s.inputs_changed(&state()));
    }

    #[test]
    fn empty_name_rejected() {
        let mut s = spec();
        s.name = String::new();
        assert!(matches!(s.validate(), Err(ResourceError::Invalid { .. })));
    }
}
