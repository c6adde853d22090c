//! engine::log_query
//!
//! Turns declarative log inputs into one immutable traversal.
//!
//! # Rules
//!
//! 1. `all` ignores `from`; otherwise `from` (default `HEAD`) must resolve
//! 2. `since` / `until` must be RFC 3339
//! 3. `order` is `"depth"`, `"breadth"`, or anything else for time order
//! 4. path patterns form one predicate: a commit is kept when any file it
//!    changed matches any pattern; a malformed pattern never matches
//!
//! # Pagination
//!
//! Up to `max_count + skip` commits are collected, then the first `skip`
//! are dropped. The result can therefore be shorter than `max_count`.
//! `max_count = 0` returns nothing.

use chrono::{DateTime, FixedOffset};
use glob::{MatchOptions, Pattern};
use tracing::debug;

use super::EngineError;
use crate::core::types::Oid;
use crate::git::{Git, WalkOrder};

/// Glob options shared by log filtering and add selection: `*` and `?`
/// never cross a `/`.
pub(crate) const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Declarative log inputs, as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogQueryInput {
    pub from: Option<String>,
    pub order: Option<String>,
    pub all: bool,
    pub since: Option<String>,
    pub until: Option<String>,
    pub max_count: Option<usize>,
    pub skip: Option<usize>,
    pub paths: Vec<String>,
}

/// Map an order string to a walk order.
pub fn parse_order(order: Option<&str>) -> WalkOrder {
    match order {
        Some("depth") => WalkOrder::DepthFirst,
        Some("breadth") => WalkOrder::BreadthFirst,
        _ => WalkOrder::Time,
    }
}

/// A file predicate built from glob patterns.
///
/// Malformed patterns are kept as non-matching entries.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    patterns: Vec<Option<Pattern>>,
}

impl PathFilter {
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| match Pattern::new(p) {
                Ok(compiled) => Some(compiled),
                Err(err) => {
                    debug!(pattern = %p, %err, "ignoring malformed log path pattern");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// True when no patterns were given; every commit passes.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when `file` matches any well-formed pattern.
    pub fn matches(&self, file: &str) -> bool {
        self.patterns
            .iter()
            .flatten()
            .any(|p| p.matches_with(file, GLOB_OPTIONS))
    }
}

/// An immutable traversal description.
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub starts: Vec<Oid>,
    pub order: WalkOrder,
    pub since: Option<DateTime<FixedOffset>>,
    pub until: Option<DateTime<FixedOffset>>,
    pub max_count: Option<usize>,
    pub skip: usize,
    pub paths: PathFilter,
}

impl LogQuery {
    /// Build a query, resolving revisions against `git`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Revision`] if `from` cannot be resolved
    /// - [`EngineError::Timestamp`] if a time bound is not RFC 3339
    pub fn build(git: &Git, input: &LogQueryInput) -> Result<Self, EngineError> {
        let starts = if input.all {
            git.all_ref_tips()?
        } else {
            let from = input.from.as_deref().unwrap_or("HEAD");
            vec![git.resolve_revision(from).map_err(EngineError::from_revision)?]
        };

        Ok(Self {
            starts,
            order: parse_order(input.order.as_deref()),
            since: parse_bound("since", input.since.as_deref())?,
            until: parse_bound("until", input.until.as_deref())?,
            max_count: input.max_count,
            skip: input.skip.unwrap_or(0),
            paths: PathFilter::new(&input.paths),
        })
    }

    /// How many matching commits to collect before dropping `skip`.
    ///
    /// `None` means the walk runs to the end.
    pub fn collect_limit(&self) -> Option<usize> {
        self.max_count.map(|n| n.saturating_add(self.skip))
    }

    /// Run the traversal and return matching commit hashes in walk order.
    pub fn run(&self, git: &Git) -> Result<Vec<Oid>, EngineError> {
        if self.max_count == Some(0) {
            return Ok(Vec::new());
        }
        let limit = self.collect_limit();

        let mut collected = Vec::new();
        for oid in git.walk(&self.starts, self.order)? {
            let oid = oid?;
            if !self.in_time_window(git.commit_time(&oid)?) {
                continue;
            }
            if !self.paths.is_empty() {
                let changed = git.changed_paths(&oid)?;
                if !changed.iter().any(|f| self.paths.matches(f)) {
                    continue;
                }
            }
            collected.push(oid);
            if limit.is_some_and(|l| collected.len() >= l) {
                break;
            }
        }

        Ok(collected.into_iter().skip(self.skip).collect())
    }

    /// Both bounds are inclusive.
    fn in_time_window(&self, seconds: i64) -> bool {
        if let Some(since) = &self.since {
            if seconds < since.timestamp() {
                return false;
            }
        }
        if let Some(until) = &self.until {
            if seconds > until.timestamp() {
                return false;
            }
        }
        true
    }
}

fn parse_bound(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<FixedOffset>>, EngineError> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(v).map_err(|e| EngineError::Timestamp {
                field,
                value: v.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}
