//! import and forget commands - Adopt or drop recorded state

use anyhow::{bail, Context as _, Result};

use super::{load_state, manifest_path, save_state};
use crate::core::lock::StateLock;
use crate::engine::Context;
use crate::resources::manifest::Manifest;
use crate::resources::{self, ResourceKind};
use crate::ui::output::Output;

/// Import an existing object and record it under `resource_id`.
pub fn import(
    ctx: &Context,
    output: &Output,
    kind: ResourceKind,
    import_id: &str,
    resource_id: &str,
) -> Result<()> {
    let _lock = StateLock::acquire(&ctx.paths()).context("cannot lock state")?;

    // A manifest is optional here, but when one declares the id the kinds must agree.
    let path = manifest_path(ctx);
    if path.exists() {
        let manifest = Manifest::load(&path)?;
        if let Some(entry) = manifest.get(resource_id) {
            if entry.spec.kind() != kind {
                bail!(
                    "resource '{}' is declared as {} but imported as {}",
                    resource_id,
                    entry.spec.kind(),
                    kind
                );
            }
        }
    }

    let mut state = load_state(ctx)?;
    if state.get(resource_id).is_some() {
        bail!(
            "resource '{}' already has recorded state; forget it first",
            resource_id
        );
    }

    let recorded = resources::import(ctx, kind, import_id)
        .with_context(|| format!("cannot import {} '{}'", kind, import_id))?;

    if output.json {
        output.json(&recorded)?;
    }
    state.insert(resource_id, recorded);
    save_state(ctx, &state)?;
    output.print(format!("Imported {} '{}' as '{}'.", kind, import_id, resource_id));
    Ok(())
}

/// Drop a resource from recorded state.
pub fn forget(ctx: &Context, output: &Output, resource_id: &str) -> Result<()> {
    let _lock = StateLock::acquire(&ctx.paths()).context("cannot lock state")?;
    let mut state = load_state(ctx)?;
    if state.remove(resource_id).is_none() {
        bail!("no recorded state for resource '{}'", resource_id);
    }
    save_state(ctx, &state)?;
    output.print(format!("Forgot '{}'.", resource_id));
    Ok(())
}
