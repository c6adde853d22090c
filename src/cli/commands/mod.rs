//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads what it needs (manifest, state, a repository)
//! 2. Calls into resources or data
//! 3. Formats and displays output
//!
//! Handlers that write state hold the project [`StateLock`] for their whole
//! run.
//!
//! [`StateLock`]: crate::core::lock::StateLock

mod apply;
mod completion;
mod config_cmd;
mod import;
mod plan;
mod read;

pub use apply::apply;
pub use completion::completion;
pub use config_cmd::{init as config_init, show as config_show};
pub use import::{forget, import};
pub use plan::{build_plan, plan};
pub use read::read;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, ConfigAction};
use crate::engine::Context;
use crate::resources::manifest::Manifest;
use crate::resources::state::StateFile;
use crate::ui::output::Output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context, output: &Output) -> Result<()> {
    match command {
        Command::Plan { targets } => plan::plan(ctx, output, &targets),
        Command::Apply { targets, expect } => {
            apply::apply(ctx, output, &targets, expect.as_deref())
        }
        Command::Import {
            kind,
            import_id,
            resource_id,
        } => import::import(ctx, output, kind, &import_id, &resource_id),
        Command::Forget { resource_id } => import::forget(ctx, output, &resource_id),
        Command::Read { fact } => read::read(ctx, output, fact),
        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx, output),
            ConfigAction::Init {
                manifest,
                state,
                force,
            } => config_cmd::init(ctx, output, manifest, state, force),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

fn manifest_path(ctx: &Context) -> PathBuf {
    ctx.paths().resolve(ctx.config.manifest())
}

fn state_path(ctx: &Context) -> PathBuf {
    ctx.paths().resolve(ctx.config.state())
}

fn load_manifest(ctx: &Context) -> Result<Manifest> {
    let path = manifest_path(ctx);
    Manifest::load(&path).with_context(|| format!("cannot load manifest {}", path.display()))
}

fn load_state(ctx: &Context) -> Result<StateFile> {
    let path = state_path(ctx);
    StateFile::load(&path).context("cannot load recorded state")
}

fn save_state(ctx: &Context, state: &StateFile) -> Result<()> {
    state
        .save(&state_path(ctx))
        .context("cannot save recorded state")
}
