//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON on stdout and
//! human-oriented messages are suppressed.

use std::fmt::Display;

use serde::Serialize;

use crate::engine::{Plan, Reconciliation};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Where command results go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub verbosity: Verbosity,
    pub json: bool,
}

impl Output {
    pub fn new(verbosity: Verbosity, json: bool) -> Self {
        Self { verbosity, json }
    }

    /// Print a human message; suppressed in quiet and JSON modes.
    pub fn print(&self, message: impl Display) {
        if !self.json {
            print(message, self.verbosity);
        }
    }

    pub fn warn(&self, message: impl Display) {
        warn(message, self.verbosity);
    }

    /// Print a serializable result as pretty JSON.
    pub fn json<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn marker(action: &Reconciliation) -> char {
    match action {
        Reconciliation::Noop => ' ',
        Reconciliation::Create => '+',
        Reconciliation::Replace { .. } => '!',
        Reconciliation::Update { .. } => '~',
    }
}

/// Render a plan for a terminal.
///
/// One line per resource, marked `+` create, `~` update, `!` replace.
/// Noop resources are only listed in debug mode.
pub fn render_plan(plan: &Plan, verbosity: Verbosity) -> String {
    let mut lines = Vec::new();
    for entry in &plan.resources {
        if entry.action.is_noop() && verbosity != Verbosity::Debug {
            continue;
        }
        lines.push(format!(
            "{} {} ({}): {}",
            marker(&entry.action),
            entry.id,
            entry.kind,
            entry.action.describe()
        ));
    }
    if !plan.orphans.is_empty() {
        lines.push("Recorded but no longer declared:".to_string());
        lines.push(format_list(&plan.orphans, "  - "));
    }

    let pending = plan.pending().count();
    if pending == 0 && plan.orphans.is_empty() {
        lines.push("No changes. Repositories match the manifest.".to_string());
    } else {
        lines.push(format!(
            "Plan: {} to change, {} unchanged.",
            pending,
            plan.resources.len() - pending
        ));
    }
    lines.join("\n")
}
