//! data::status
//!
//! Working tree status with porcelain-style codes.

use serde::Serialize;

use super::DataError;
use crate::git::Git;

/// One changed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub path: String,
    pub staging: char,
    pub worktree: char,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusFact {
    pub is_clean: bool,
    pub files: Vec<FileStatus>,
}

pub fn read(git: &Git) -> Result<StatusFact, DataError> {
    let files: Vec<FileStatus> = git
        .status()?
        .into_iter()
        .map(|e| FileStatus {
            staging: e.staging.code(),
            worktree: e.worktree.code(),
            path: e.path,
        })
        .collect();
    Ok(StatusFact {
        is_clean: files.is_empty(),
        files,
    })
}
