//! engine::plan
//!
//! Reconciliation outcomes and whole-manifest plans.
//!
//! # Architecture
//!
//! Every resource answers `plan(desired, previous)` with a [`Reconciliation`].
//! A [`Plan`] collects one outcome per resource in manifest order and is the
//! only thing `apply` acts on.
//!
//! Plans are:
//! - **Deterministic**: Same input always produces the same plan
//! - **Previewable**: Can be shown to user before execution
//! - **Serializable**: Rendered as JSON for machine consumption
//!
//! # Invariants
//!
//! - Planning never mutates a repository
//! - A `Noop` entry is skipped by apply
//!
//! # Example
//!
//! ```
//! use gitform::engine::plan::{Plan, PlannedResource, Reconciliation};
//!
//! let plan = Plan::new(vec![
//!     PlannedResource::new("repo", "repository", Reconciliation::Create),
//!     PlannedResource::new("tag", "tag", Reconciliation::Noop),
//! ]);
//!
//! assert!(!plan.is_empty());
//! assert_eq!(plan.pending().count(), 1);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What a resource needs in order to match its declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Reconciliation {
    /// Recorded state still describes reality.
    Noop,
    /// Nothing recorded yet.
    Create,
    /// The resource must be recreated.
    Replace {
        reason: String,
        /// Extra detail shown to the operator, e.g. a new expected hash.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// The resource can be changed in place.
    Update { changes: Vec<String> },
}

impl Reconciliation {
    /// Shorthand for a replace with no detail.
    pub fn replace(reason: impl Into<String>) -> Self {
        Reconciliation::Replace {
            reason: reason.into(),
            detail: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Reconciliation::Noop)
    }

    /// Short verb for display.
    pub fn verb(&self) -> &'static str {
        match self {
            Reconciliation::Noop => "no changes",
            Reconciliation::Create => "create",
            Reconciliation::Replace { .. } => "replace",
            Reconciliation::Update { .. } => "update",
        }
    }

    /// Human-readable one-line description.
    pub fn describe(&self) -> String {
        match self {
            Reconciliation::Noop => "no changes".to_string(),
            Reconciliation::Create => "create".to_string(),
            Reconciliation::Replace {
                reason,
                detail: Some(detail),
            } => format!("replace ({}: {})", reason, detail),
            Reconciliation::Replace { reason, .. } => format!("replace ({})", reason),
            Reconciliation::Update { changes } => format!("update ({})", changes.join(", ")),
        }
    }
}

/// One resource's planned action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedResource {
    pub id: String,
    pub kind: String,
    #[serde(flatten)]
    pub action: Reconciliation,
}

impl PlannedResource {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, action: Reconciliation) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            action,
        }
    }
}

/// Planned actions for a whole manifest, in manifest order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub resources: Vec<PlannedResource>,
    /// Ids recorded in state but no longer declared.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphans: Vec<String>,
}

impl Plan {
    pub fn new(resources: Vec<PlannedResource>) -> Self {
        Self {
            resources,
            orphans: Vec::new(),
        }
    }

    pub fn with_orphans(mut self, orphans: Vec<String>) -> Self {
        self.orphans = orphans;
        self
    }

    /// True when nothing needs to run.
    pub fn is_empty(&self) -> bool {
        self.pending().next().is_none() && self.orphans.is_empty()
    }

    /// Entries that apply will act on.
    pub fn pending(&self) -> impl Iterator<Item = &PlannedResource> {
        self.resources.iter().filter(|r| !r.action.is_noop())
    }

    /// Content digest of the plan.
    ///
    /// Two plans with the same digest describe the same actions.
    pub fn digest(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&json))
    }
}
