//! core::lock
//!
//! Exclusive project lock held while state is read, applied and written.
//!
//! # Storage
//!
//! - `.gitform/state.lock` - Lock file with OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock is automatically released on drop (RAII pattern)
//! - Lock acquisition is non-blocking (fails fast if locked)
//!
//! The lock only serializes gitform processes sharing one state file. It
//! does not guard the managed repositories against other Git clients.
//!
//! # Example
//!
//! ```ignore
//! use gitform::core::lock::StateLock;
//! use gitform::core::paths::ProjectPaths;
//!
//! let lock = StateLock::acquire(&ProjectPaths::new("/work"))?;
//! // ... plan, apply, save state ...
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::ProjectPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("state is locked by another gitform process ({path})")]
    AlreadyLocked { path: PathBuf },

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on a project's state.
#[derive(Debug)]
pub struct StateLock {
    path: PathBuf,
    /// The open file handle with the lock held.
    file: File,
}

impl StateLock {
    /// Acquire the lock for a project, creating `.gitform/` if needed.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    pub fn acquire(paths: &ProjectPaths) -> Result<Self, LockError> {
        let dir = paths.gitform_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Self::acquire_at(&paths.lock_path())
    }

    /// Acquire a lock at an explicit path.
    pub fn acquire_at(path: &Path) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path: path.to_path_buf(),
                file,
            }),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(LockError::AlreadyLocked {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
