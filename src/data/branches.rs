//! data::branches
//!
//! Local and remote-tracking branches.

use serde::Serialize;

use super::DataError;
use crate::core::types::Oid;
use crate::git::Git;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    pub remote: bool,
    /// `None` for symbolic remote heads such as `origin/HEAD`.
    pub sha1: Option<Oid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchesFact {
    /// Checked-out local branch, `None` when HEAD is detached.
    pub current: Option<String>,
    pub branches: Vec<Branch>,
}

pub fn read(git: &Git) -> Result<BranchesFact, DataError> {
    let mut current = None;
    let mut branches = Vec::new();
    for info in git.list_branches()? {
        if info.is_head && !info.remote {
            current = Some(info.name.clone());
        }
        branches.push(Branch {
            name: info.name,
            remote: info.remote,
            sha1: info.oid,
        });
    }
    Ok(BranchesFact { current, branches })
}
