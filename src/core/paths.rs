//! core::paths
//!
//! Centralized path routing for gitform files.
//!
//! # Layout
//!
//! A project is a working directory holding:
//! - `gitform.toml` - the manifest (desired configuration)
//! - `gitform.state.json` - recorded state
//! - `.gitform/config.toml` - project-level tool configuration
//! - `.gitform/state.lock` - exclusive lock held while applying
//!
//! Manifest and state names can be overridden through configuration;
//! relative overrides resolve against the project root.
//!
//! # Example
//!
//! ```
//! use gitform::core::paths::ProjectPaths;
//! use std::path::PathBuf;
//!
//! let paths = ProjectPaths::new("/work");
//! assert_eq!(paths.project_config_path(), PathBuf::from("/work/.gitform/config.toml"));
//! assert_eq!(paths.resolve("gitform.toml"), PathBuf::from("/work/gitform.toml"));
//! ```

use std::path::{Path, PathBuf};

/// Paths of OpenSSH's default known-hosts files.
const SYSTEM_KNOWN_HOSTS: &str = "/etc/ssh/ssh_known_hosts";

/// Path routing for one project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The `.gitform` directory under the project root.
    pub fn gitform_dir(&self) -> PathBuf {
        self.root.join(".gitform")
    }

    pub fn project_config_path(&self) -> PathBuf {
        self.gitform_dir().join("config.toml")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.gitform_dir().join("state.lock")
    }

    /// Resolve a configured file name against the project root.
    ///
    /// Absolute and `~`-prefixed paths are returned expanded but otherwise untouched.
    pub fn resolve(&self, configured: impl AsRef<Path>) -> PathBuf {
        let expanded = expand_home(configured.as_ref());
        if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        }
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or when no home directory is known, are
/// returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Default known-hosts files that exist on this machine.
///
/// Checks `~/.ssh/known_hosts` and `/etc/ssh/ssh_known_hosts`, in that order.
pub fn system_known_hosts() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".ssh/known_hosts"));
    }
    candidates.push(PathBuf::from(SYSTEM_KNOWN_HOSTS));
    candidates.into_iter().filter(|p| p.is_file()).collect()
}
