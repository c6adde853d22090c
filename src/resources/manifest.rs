//! resources::manifest
//!
//! The manifest: declared resources, applied in file order.
//!
//! ```toml
//! [[resource]]
//! id = "app"
//! type = "clone"
//! directory = "app"
//! url = "git@github.com:acme/app.git"
//!
//! [resource.auth.ssh_agent]
//! username = "git"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ResourceSpec;

/// Errors from reading the manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("resource #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate resource id '{0}'")]
    DuplicateId(String),
}

/// One declared resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    #[serde(flatten)]
    pub spec: ResourceSpec,
}

/// The parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "resource")]
    pub resources: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Parse manifest text; `path` is only used in error messages.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(contents).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for (index, entry) in self.resources.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(ManifestError::EmptyId { index: index + 1 });
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ManifestError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.resources.iter().find(|e| e.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|e| e.id.as_str())
    }
}
