//! config command - Show or initialize tool configuration

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use crate::core::config::schema::ConfigFile;
use crate::core::config::Config;
use crate::engine::Context;
use crate::ui::output::{format_list, Output};

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    manifest: String,
    state: String,
    known_hosts: Vec<PathBuf>,
    default_reference: String,
    sources: Vec<PathBuf>,
}

/// Print the effective configuration.
pub fn show(ctx: &Context, output: &Output) -> Result<()> {
    let config = &ctx.config;
    let effective = EffectiveConfig {
        manifest: config.manifest().to_string(),
        state: config.state().to_string(),
        known_hosts: config.known_hosts(),
        default_reference: config.default_reference().to_string(),
        sources: config.sources().into_iter().map(PathBuf::from).collect(),
    };

    if output.json {
        output.json(&effective)?;
        return Ok(());
    }

    println!("manifest = {}", effective.manifest);
    println!("state = {}", effective.state);
    println!("clone.default_reference = {}", effective.default_reference);
    if effective.known_hosts.is_empty() {
        println!("ssh.known_hosts = (system defaults)");
    } else {
        let files: Vec<_> = effective.known_hosts.iter().map(|p| p.display()).collect();
        println!("ssh.known_hosts =\n{}", format_list(&files, "  "));
    }
    if effective.sources.is_empty() {
        output.print("(no configuration files loaded)");
    } else {
        let files: Vec<_> = effective.sources.iter().map(|p| p.display()).collect();
        output.print(format!("loaded from:\n{}", format_list(&files, "  ")));
    }
    Ok(())
}

/// Write `.gitform/config.toml` in the project root.
pub fn init(
    ctx: &Context,
    output: &Output,
    manifest: Option<String>,
    state: Option<String>,
    force: bool,
) -> Result<()> {
    let path = ctx.paths().project_config_path();
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }

    let file = ConfigFile {
        manifest,
        state,
        ..ConfigFile::default()
    };
    file.validate().context("invalid configuration")?;
    let written = Config::write_project(&ctx.root, &file).context("cannot write configuration")?;
    output.print(format!("Wrote {}", written.display()));
    Ok(())
}
