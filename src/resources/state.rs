//! resources::state
//!
//! The state file: recorded state of every applied resource.
//!
//! # Format
//!
//! Pretty-printed JSON keyed by resource id:
//!
//! ```json
//! {
//!   "version": 1,
//!   "resources": {
//!     "app": { "type": "repository", "directory": "app", "bare": false }
//!   }
//! }
//! ```
//!
//! The version is checked through a small envelope before the full parse,
//! so a file written by a newer release is rejected with a clear error
//! instead of a field mismatch.
//!
//! # Writes
//!
//! Saves go to a uniquely named temporary file next to the target and are
//! renamed into place, so a crash never leaves a truncated state file.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::ResourceState;

/// Current state file version.
pub const STATE_VERSION: u32 = 1;

/// Errors from reading or writing the state file.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse state file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported state file version {found} in '{path}', supported: {STATE_VERSION}")]
    UnsupportedVersion { path: PathBuf, found: u32 },

    #[error("failed to write state file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Deserialize)]
struct StateEnvelope {
    version: u32,
}

/// Recorded state of every resource, keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            resources: BTreeMap::new(),
        }
    }
}

impl StateFile {
    /// Load the state file, or an empty one when it does not exist yet.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(path, &contents)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, StateError> {
        let parse_error = |e: serde_json::Error| StateError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let envelope: StateEnvelope = serde_json::from_str(contents).map_err(parse_error)?;
        if envelope.version != STATE_VERSION {
            return Err(StateError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: envelope.version,
            });
        }
        serde_json::from_str(contents).map_err(parse_error)
    }

    pub fn get(&self, id: &str) -> Option<&ResourceState> {
        self.resources.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, state: ResourceState) {
        self.resources.insert(id.into(), state);
    }

    pub fn remove(&mut self, id: &str) -> Option<ResourceState> {
        self.resources.remove(id)
    }

    /// Write the state file atomically.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let write_error = |source: std::io::Error| StateError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let mut contents = serde_json::to_string_pretty(self).map_err(|e| StateError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;
        contents.push('\n');

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state".to_string());
        let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        let result = (|| {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, path)
        })();
        if let Err(source) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(write_error(source));
        }
        debug!(path = %path.display(), resources = self.resources.len(), "saved state");
        Ok(())
    }
}
