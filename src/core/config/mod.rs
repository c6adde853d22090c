//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! gitform has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Overrides stored next to the manifest
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GITFORM_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitform/config.toml`
//! 3. `~/.gitform/config.toml` (canonical write location)
//!
//! # Project Config Location
//!
//! `.gitform/config.toml` under the project root.
//!
//! # Example
//!
//! ```no_run
//! use gitform::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! let config = result.config;
//!
//! println!("Manifest: {}", config.manifest());
//! println!("Default clone reference: {}", config.default_reference());
//! ```

pub mod schema;

pub use schema::{CloneDefaults, ConfigFile, SshDefaults};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::paths::{expand_home, ProjectPaths};

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "gitform.toml";
/// Default state file name.
pub const DEFAULT_STATE: &str = "gitform.state.json";
/// Branch compared against local HEAD when a clone declares no reference.
pub const DEFAULT_REFERENCE: &str = "refs/heads/main";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// This struct provides accessor methods that apply precedence rules
/// automatically. Project config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Project configuration (if present)
    pub project: Option<ConfigFile>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the project config file (if loaded)
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_root` is provided, also loads `.gitform/config.toml` there.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(project_root: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();
        let (global, global_path) = Self::load_global(&mut warnings)?;
        Self::finish(global, global_path, project_root, warnings)
    }

    /// Load configuration with an explicit global file instead of the search path.
    pub fn load_with(
        global_file: &Path,
        project_root: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let global = Self::read_config(global_file)?;
        Self::finish(
            global,
            Some(global_file.to_path_buf()),
            project_root,
            Vec::new(),
        )
    }

    fn finish(
        global: ConfigFile,
        global_path: Option<PathBuf>,
        project_root: Option<&Path>,
        warnings: Vec<ConfigWarning>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let (project, project_path) = match project_root {
            Some(root) => Self::load_project(root)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path,
                project_path,
            },
            warnings,
        })
    }

    /// Load global configuration from standard locations.
    fn load_global(
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(ConfigFile, Option<PathBuf>), ConfigError> {
        // 1. Check $GITFORM_CONFIG
        if let Ok(path) = std::env::var("GITFORM_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
            warnings.push(ConfigWarning {
                message: "GITFORM_CONFIG points to a missing file; ignoring it".to_string(),
                path,
            });
        }

        // 2. Check $XDG_CONFIG_HOME/gitform/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gitform/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.gitform/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".gitform/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((ConfigFile::default(), None))
    }

    fn load_project(root: &Path) -> Result<(Option<ConfigFile>, Option<PathBuf>), ConfigError> {
        let path = ProjectPaths::new(root).project_config_path();
        if !path.exists() {
            return Ok((None, None));
        }
        let config = Self::read_config(&path)?;
        Ok((Some(config), Some(path)))
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.gitform/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".gitform/config.toml"))
    }

    /// Write project config atomically.
    ///
    /// Creates parent directories if needed. Uses atomic write
    /// (write to temp file, then rename) to prevent corruption.
    pub fn write_project(root: &Path, config: &ConfigFile) -> Result<PathBuf, ConfigError> {
        let path = ProjectPaths::new(root).project_config_path();
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file atomically.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        // Write to temp file in same directory (for atomic rename)
        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn pick<'a, T>(&'a self, get: impl Fn(&'a ConfigFile) -> Option<T>) -> Option<T> {
        self.project.as_ref().and_then(&get).or_else(|| get(&self.global))
    }

    /// Manifest file name.
    ///
    /// Defaults to `gitform.toml`.
    pub fn manifest(&self) -> &str {
        self.pick(|c| c.manifest.as_deref())
            .unwrap_or(DEFAULT_MANIFEST)
    }

    /// State file name.
    ///
    /// Defaults to `gitform.state.json`.
    pub fn state(&self) -> &str {
        self.pick(|c| c.state.as_deref()).unwrap_or(DEFAULT_STATE)
    }

    /// Known-hosts files for SSH resources that declare none, `~` expanded.
    ///
    /// Empty means the system defaults apply.
    pub fn known_hosts(&self) -> Vec<PathBuf> {
        self.pick(|c| c.ssh.as_ref().and_then(|s| s.known_hosts.as_ref()))
            .map(|files| files.iter().map(|f| expand_home(Path::new(f))).collect())
            .unwrap_or_default()
    }

    /// Branch ref used by clone drift detection when none is declared.
    ///
    /// Defaults to `refs/heads/main`.
    pub fn default_reference(&self) -> &str {
        self.pick(|c| c.clone.as_ref().and_then(|c| c.default_reference.as_deref()))
            .unwrap_or(DEFAULT_REFERENCE)
    }

    /// Paths of the files that were actually loaded.
    pub fn sources(&self) -> Vec<&Path> {
        [self.global_path.as_deref(), self.project_path.as_deref()]
            .into_iter()
            .flatten()
            .collect()
    }
}
