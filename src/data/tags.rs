//! data::tags
//!
//! Tags with their target commit and kind.

use serde::Serialize;

use super::DataError;
use crate::engine::tag::{self, TagTarget};
use crate::git::{Git, Lookup};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(flatten)]
    pub target: TagTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagsFact {
    pub tags: Vec<Tag>,
}

pub fn read(git: &Git) -> Result<TagsFact, DataError> {
    let mut tags = Vec::new();
    for name in git.tag_names()? {
        // Tags pointing at trees or blobs have no commit to report.
        let Ok(found) = tag::read(git, &name) else {
            continue;
        };
        if let Lookup::Found(target) = found {
            tags.push(Tag { name, target });
        }
    }
    Ok(TagsFact { tags })
}
