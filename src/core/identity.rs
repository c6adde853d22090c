//! core::identity
//!
//! Commit identities.
//!
//! A [`PartialIdentity`] is what the manifest declares: either field may be
//! missing and is filled in later from repository configuration. A
//! [`CommitIdentity`] is the fully resolved pair handed to the git layer, and
//! a [`RecordedSignature`] is what gets read back from a created commit.

use serde::{Deserialize, Serialize};

/// A possibly incomplete identity as declared in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl PartialIdentity {
    /// True when neither field was supplied.
    pub fn is_unspecified(&self) -> bool {
        blank(&self.name) && blank(&self.email)
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// A complete name/email pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl std::fmt::Display for CommitIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// An identity as stored in a commit or tag object, with its timestamp.
///
/// `timestamp` is RFC 3339 with the signature's original UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedSignature {
    pub name: String,
    pub email: String,
    pub timestamp: String,
}
