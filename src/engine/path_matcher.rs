//! engine::path_matcher
//!
//! Selects the working-tree files an add operation touches.
//!
//! A file is selected when its worktree state is not unmodified and it
//! matches at least one pattern. Patterns use filesystem-glob syntax, not
//! Git pathspecs: `*` stops at `/`, so recursion must be spelled out
//! (`docs/**/*.md`). Unlike log filtering, a malformed pattern is fatal
//! because the selection drives a mutation.

use std::collections::HashSet;

use glob::Pattern;

use super::log_query::GLOB_OPTIONS;
use super::EngineError;
use crate::git::{FileState, StatusEntry};

/// Compiled add patterns.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    patterns: Vec<Pattern>,
}

impl PathMatcher {
    /// Compile patterns.
    ///
    /// # Errors
    ///
    /// [`EngineError::Pattern`] for the first malformed pattern.
    pub fn new(patterns: &[String]) -> Result<Self, EngineError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| EngineError::Pattern {
                    pattern: p.clone(),
                    message: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(path, GLOB_OPTIONS))
    }

    /// Changed entries matching any pattern, each at most once, in input order.
    pub fn select<'a>(&self, entries: &'a [StatusEntry]) -> Vec<&'a StatusEntry> {
        let mut seen = HashSet::new();
        entries
            .iter()
            .filter(|e| e.worktree != FileState::Unmodified)
            .filter(|e| self.matches(&e.path))
            .filter(|e| seen.insert(e.path.as_str()))
            .collect()
    }
}
