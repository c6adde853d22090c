//! data::log
//!
//! Ordered commit hashes selected by a log query.

use serde::Serialize;

use super::DataError;
use crate::core::types::Oid;
use crate::engine::log_query::{LogQuery, LogQueryInput};
use crate::git::Git;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogFact {
    pub commits: Vec<Oid>,
}

pub fn read(git: &Git, input: &LogQueryInput) -> Result<LogFact, DataError> {
    let query = LogQuery::build(git, input)?;
    Ok(LogFact {
        commits: query.run(git)?,
    })
}
