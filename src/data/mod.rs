//! data
//!
//! Read-only facts about a repository.
//!
//! Each fact is a serializable record built from one or two git calls. The
//! only fact with real logic behind it is [`log`], which runs a
//! [`LogQuery`](crate::engine::log_query::LogQuery).

pub mod branches;
pub mod config;
pub mod log;
pub mod remotes;
pub mod status;
pub mod tags;

use thiserror::Error;

use crate::engine::EngineError;
use crate::git::GitError;

/// Errors from reading facts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("unknown config scope '{0}': expected local, global or system")]
    UnknownScope(String),
}
