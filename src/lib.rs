//! gitform - declarative management of local Git repositories
//!
//! gitform reads a manifest of repository resources (init, clone, add,
//! commit, tag, remote, push), compares it with recorded state and with the
//! live repositories, and reconciles the difference through a plan/apply
//! cycle. It can also import existing objects and report read-only facts.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates)
//! - [`resources`] - Managed entities with plan, apply and import
//! - [`engine`] - Reconciliation decisions: drift, log queries, commit and tag logic
//! - [`data`] - Read-only repository facts
//! - [`auth`] - Credential resolution for remote operations
//! - [`core`] - Domain types, configuration and project files
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. Planning never mutates a repository
//! 2. Recorded state is written only after an operation succeeded
//! 3. No operation is retried; every failure is reported once

pub mod auth;
pub mod cli;
pub mod core;
pub mod data;
pub mod engine;
pub mod git;
pub mod resources;
pub mod ui;
