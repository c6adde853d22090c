//! apply command - Reconcile repositories with the manifest

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use tracing::info;

use super::{build_plan, load_manifest, load_state, save_state};
use crate::core::lock::StateLock;
use crate::engine::Context;
use crate::ui::output::Output;

#[derive(Debug, Serialize)]
struct ApplyReport {
    digest: String,
    applied: Vec<String>,
    forgotten: Vec<String>,
}

/// Plan, then run every pending action in manifest order.
///
/// State is saved after each resource. The first failure stops the run.
pub fn apply(
    ctx: &Context,
    output: &Output,
    targets: &[String],
    expect: Option<&str>,
) -> Result<()> {
    let _lock = StateLock::acquire(&ctx.paths()).context("cannot lock state")?;
    let manifest = load_manifest(ctx)?;
    let mut state = load_state(ctx)?;

    let plan = build_plan(ctx, &manifest, &state, targets)?;
    let digest = plan.digest();
    if let Some(expected) = expect {
        if !expected.eq_ignore_ascii_case(&digest) {
            bail!(
                "plan changed since it was reviewed (expected digest {}, got {})",
                expected,
                digest
            );
        }
    }

    let mut applied = Vec::new();
    for planned in plan.pending() {
        let Some(entry) = manifest.get(&planned.id) else {
            continue;
        };
        output.print(format!("{} ({}): {}...", planned.id, planned.kind, planned.action.verb()));

        let recorded = entry
            .spec
            .apply(ctx, state.get(&planned.id), &planned.action)
            .with_context(|| format!("cannot apply resource '{}'", planned.id))?;
        state.insert(planned.id.clone(), recorded);
        save_state(ctx, &state)?;

        info!(id = %planned.id, action = planned.action.verb(), "applied");
        applied.push(planned.id.clone());
    }

    for orphan in &plan.orphans {
        state.remove(orphan);
        output.print(format!("{}: forgotten", orphan));
    }
    if !plan.orphans.is_empty() {
        save_state(ctx, &state)?;
    }

    if output.json {
        output.json(&ApplyReport {
            digest,
            applied,
            forgotten: plan.orphans.clone(),
        })?;
    } else {
        output.print(format!(
            "Apply complete: {} changed, {} forgotten.",
            applied.len(),
            plan.orphans.len()
        ));
    }
    Ok(())
}
