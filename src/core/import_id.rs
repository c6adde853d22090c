//! core::import_id
//!
//! Parsing of import identifiers.
//!
//! Import adopts an existing repository object into recorded state. The
//! identifier is a `|`-separated string:
//!
//! - `<directory>` for single-field resources (repository, clone, add, push)
//! - `<directory>|<name>` for named sub-resources (remote, tag)
//! - `<directory>|<name>|<revision>` for tags, revision defaulting to `HEAD`
//! - `<directory>` or `<directory>|<revision>` for commits
//!
//! # Example
//!
//! ```
//! use gitform::core::import_id::ImportId;
//!
//! let id = ImportId::parse_tag("/srv/repo|v1.0").unwrap();
//! assert_eq!(id.name.as_deref(), Some("v1.0"));
//! assert_eq!(id.revision.as_deref(), Some("HEAD"));
//!
//! assert!(ImportId::parse_named("/srv/repo").is_err());
//! ```

use std::path::PathBuf;

use thiserror::Error;

const SEPARATOR: char = '|';

/// Errors from import identifier parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportIdError {
    #[error("invalid import identifier '{input}': expected format {expected}")]
    Malformed { input: String, expected: &'static str },
}

/// A parsed import identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportId {
    pub directory: PathBuf,
    pub name: Option<String>,
    pub revision: Option<String>,
}

impl ImportId {
    /// Parse `<directory>`.
    pub fn parse_directory(raw: &str) -> Result<Self, ImportIdError> {
        const EXPECTED: &str = "'<directory>'";
        let parts = split(raw, 1, 1, EXPECTED)?;
        Ok(Self {
            directory: PathBuf::from(parts[0]),
            name: None,
            revision: None,
        })
    }

    /// Parse `<directory>|<name>`.
    pub fn parse_named(raw: &str) -> Result<Self, ImportIdError> {
        const EXPECTED: &str = "'<directory>|<name>'";
        let parts = split(raw, 2, 2, EXPECTED)?;
        Ok(Self {
            directory: PathBuf::from(parts[0]),
            name: Some(parts[1].to_string()),
            revision: None,
        })
    }

    /// Parse `<directory>|<name>[|<revision>]`, revision defaulting to `HEAD`.
    pub fn parse_tag(raw: &str) -> Result<Self, ImportIdError> {
        const EXPECTED: &str = "'<directory>|<name>' or '<directory>|<name>|<revision>'";
        let parts = split(raw, 2, 3, EXPECTED)?;
        Ok(Self {
            directory: PathBuf::from(parts[0]),
            name: Some(parts[1].to_string()),
            revision: Some(parts.get(2).copied().unwrap_or("HEAD").to_string()),
        })
    }

    /// Parse `<directory>[|<revision>]`, revision defaulting to `HEAD`.
    pub fn parse_revision(raw: &str) -> Result<Self, ImportIdError> {
        const EXPECTED: &str = "'<directory>' or '<directory>|<revision>'";
        let parts = split(raw, 1, 2, EXPECTED)?;
        Ok(Self {
            directory: PathBuf::from(parts[0]),
            name: None,
            revision: Some(parts.get(1).copied().unwrap_or("HEAD").to_string()),
        })
    }
}

fn split<'a>(
    raw: &'a str,
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<Vec<&'a str>, ImportIdError> {
    let parts: Vec<&str> = raw.split(SEPARATOR).collect();
    if parts.len() < min || parts.len() > max || parts.iter().any(|p| p.trim().is_empty()) {
        return Err(ImportIdError::Malformed {
            input: raw.to_string(),
            expected,
        });
    }
    Ok(parts)
}
