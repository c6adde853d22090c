//! data::config
//!
//! Key/value pairs of one git configuration scope.

use serde::Serialize;

use super::DataError;
use crate::git::{ConfigScope, Git};

/// Map a scope name; `None` reads the merged configuration.
pub fn parse_scope(scope: Option<&str>) -> Result<ConfigScope, DataError> {
    match scope {
        None => Ok(ConfigScope::Merged),
        Some("local") => Ok(ConfigScope::Local),
        Some("global") => Ok(ConfigScope::Global),
        Some("system") => Ok(ConfigScope::System),
        Some(other) => Err(DataError::UnknownScope(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigFact {
    pub entries: Vec<ConfigEntry>,
}

impl ConfigFact {
    /// Last value of `key`, matching git's precedence for single-valued keys.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }
}

pub fn read(git: &Git, scope: ConfigScope) -> Result<ConfigFact, DataError> {
    let entries = git
        .config_entries(scope)?
        .into_iter()
        .map(|(key, value)| ConfigEntry { key, value })
        .collect();
    Ok(ConfigFact { entries })
}
