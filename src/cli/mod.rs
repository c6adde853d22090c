//! cli
//!
//! Command-line interface layer for gitform.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and build the [`Context`]
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers load the manifest and state, call into
//! [`crate::resources`] and [`crate::data`], and render results through
//! [`crate::ui::output`]. Handlers return `anyhow::Result`; the library
//! layers below use typed errors.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::engine::Context;
use crate::ui::output::{Output, Verbosity};
use args::Command;

/// Run the CLI application with parsed arguments.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let output = Output::new(Verbosity::from_flags(cli.quiet, cli.debug), cli.json);

    if let Command::Completion { shell } = cli.command {
        return commands::completion(shell);
    }

    let root = match cli.cwd {
        Some(ref dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let loaded = match cli.config {
        Some(ref file) => Config::load_with(file, Some(&root)),
        None => Config::load(Some(&root)),
    }
    .context("failed to load configuration")?;
    for warning in &loaded.warnings {
        output.warn(format!("{} ({})", warning.message, warning.path.display()));
    }

    let mut ctx = Context::new(root, loaded.config);
    ctx.debug = cli.debug;
    ctx.quiet = cli.quiet;

    commands::dispatch(cli.command, &ctx, &output)
}
