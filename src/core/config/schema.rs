//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the project file; the
//! project file overrides the global one field by field.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the default clone reference must be a valid ref name).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::RefName;

/// Tool configuration as stored on disk.
///
/// # Example
///
/// ```toml
/// manifest = "gitform.toml"
/// state = "gitform.state.json"
///
/// [ssh]
/// known_hosts = ["~/.ssh/known_hosts"]
///
/// [clone]
/// default_reference = "refs/heads/main"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Manifest file name, relative to the project root
    pub manifest: Option<String>,

    /// State file name, relative to the project root
    pub state: Option<String>,

    /// SSH defaults
    pub ssh: Option<SshDefaults>,

    /// Clone defaults
    pub clone: Option<CloneDefaults>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("manifest", &self.manifest), ("state", &self.state)] {
            if let Some(v) = value {
                if v.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(format!(
                        "{} cannot be empty",
                        field
                    )));
                }
            }
        }

        if let Some(ssh) = &self.ssh {
            ssh.validate()?;
        }
        if let Some(clone) = &self.clone {
            clone.validate()?;
        }

        Ok(())
    }
}

/// SSH defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SshDefaults {
    /// Known-hosts files used when a resource declares none.
    ///
    /// Empty means the system defaults.
    pub known_hosts: Option<Vec<String>>,
}

impl SshDefaults {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(files) = &self.known_hosts {
            if files.iter().any(|f| f.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "ssh.known_hosts entries cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Clone defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CloneDefaults {
    /// Branch ref compared against local HEAD when a clone declares none.
    pub default_reference: Option<String>,
}

impl CloneDefaults {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(reference) = &self.default_reference {
            let parsed = RefName::new(reference.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid clone.default_reference: {}", e))
            })?;
            if !parsed.is_branch_ref() {
                return Err(ConfigError::InvalidValue(format!(
                    "clone.default_reference must be a branch ref, got '{}'",
                    reference
                )));
            }
        }
        Ok(())
    }
}
