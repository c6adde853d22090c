//! auth::errors
//!
//! Error types for credential resolution.
//!
//! Error messages MUST NOT contain passwords, tokens or key material. Paths
//! and usernames are fine; everything else is described, never echoed.
//!
//! # Example
//!
//! ```
//! use gitform::auth::AuthError;
//!
//! let err = AuthError::InvalidSshKeyConfig;
//! assert_eq!(err.to_string(), "Invalid SSH key configuration");
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors from auth configuration and credential resolution.
///
/// All variants are fatal configuration errors except
/// [`AuthError::KnownHosts`], which the resolver downgrades to a warning.
#[derive(Debug, Error)]
pub enum AuthError {
    /// More than one auth variant was declared.
    #[error("conflicting auth configuration: only one of {0} may be set")]
    ConflictingVariants(String),

    /// An SSH key auth block without a key source.
    #[error("Invalid SSH key configuration")]
    InvalidSshKeyConfig,

    /// An SSH key auth block with both a key path and inline key text.
    #[error("invalid SSH key configuration: private_key_path and private_key_pem are mutually exclusive")]
    AmbiguousSshKeySource,

    /// A required field was empty.
    #[error("auth field '{0}' is required")]
    MissingField(&'static str),

    /// The private key file could not be read.
    #[error("cannot read private key '{path}': {source}")]
    KeyRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The private key text is not a PEM-encoded private key.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// A known-hosts file could not be loaded.
    #[error("known hosts: {0}")]
    KnownHosts(String),
}
