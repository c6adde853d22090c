//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing, JSON results and plan rendering
//!
//! # Design
//!
//! All command output goes through this module so `--quiet` and `--json`
//! behave the same everywhere. Diagnostics go through `tracing` instead.

pub mod output;
