//! core
//!
//! Core domain types, configuration, and project files.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, RefName
//! - [`identity`] - Commit identities and recorded signatures
//! - [`import_id`] - Import identifier parsing
//! - [`config`] - Tool configuration schema and loading
//! - [`paths`] - Centralized path routing for project files
//! - [`lock`] - Exclusive state lock
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing

pub mod config;
pub mod identity;
pub mod import_id;
pub mod lock;
pub mod paths;
pub mod types;
