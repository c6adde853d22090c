//! data::remotes

use serde::Serialize;

use super::DataError;
use crate::git::Git;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemotesFact {
    pub remotes: Vec<Remote>,
}

pub fn read(git: &Git) -> Result<RemotesFact, DataError> {
    let remotes = git
        .list_remotes()?
        .into_iter()
        .map(|r| Remote {
            name: r.name,
            urls: r.urls,
        })
        .collect();
    Ok(RemotesFact { remotes })
}
