//! auth
//!
//! Credentials for remote operations (clone, drift detection, push).
//!
//! # Architecture
//!
//! - [`AuthConfig`] - manifest tables, converted once into [`AuthSpec`]
//! - [`AuthSpec`] - closed sum type with exactly one active strategy
//! - [`resolve`] - loads key material and builds the host-key policy,
//!   producing a [`Transport`]
//! - [`KnownHosts`] - OpenSSH known-hosts parsing and verification
//! - [`Secret`] - redacting wrapper for passwords, tokens and keys
//!
//! This module never imports `git2`; the git layer turns a [`Transport`]
//! into libgit2 callbacks.
//!
//! # Security
//!
//! Secrets never appear in logs, errors, JSON output or recorded state.
//!
//! # Example
//!
//! ```
//! use gitform::auth::{resolve, AuthSpec};
//!
//! // Anonymous access resolves to no credential at all.
//! assert!(resolve(&AuthSpec::None, &[]).unwrap().is_none());
//! ```

mod errors;
mod known_hosts;
mod resolver;
mod secret;
mod spec;

pub use errors::AuthError;
pub use known_hosts::{HostKeyVerdict, KnownHosts};
pub use resolver::{resolve, Credential, HostKeyPolicy, Transport};
pub use secret::{Secret, SecretString, REDACTED};
pub use spec::{
    AuthConfig, AuthSpec, BasicConfig, BearerConfig, KeySource, SshAgentConfig, SshKeyConfig,
    SshPasswordConfig, DEFAULT_SSH_USER,
};
