//! plan command - Show what apply would do

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use super::{load_manifest, load_state};
use crate::engine::{Context, Plan, PlannedResource};
use crate::resources::manifest::Manifest;
use crate::resources::state::StateFile;
use crate::ui::output::{render_plan, Output};

/// Plan as printed with `--json`.
#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    digest: String,
    #[serde(flatten)]
    plan: &'a Plan,
}

/// Plan every declared resource, or only `targets` when given.
///
/// Orphans are reported only for a full plan; a targeted plan says nothing
/// about resources it did not look at.
pub fn build_plan(
    ctx: &Context,
    manifest: &Manifest,
    state: &StateFile,
    targets: &[String],
) -> Result<Plan> {
    for target in targets {
        if manifest.get(target).is_none() {
            bail!("no resource with id '{}' in the manifest", target);
        }
    }

    let mut resources = Vec::new();
    for entry in &manifest.resources {
        if !targets.is_empty() && !targets.contains(&entry.id) {
            continue;
        }
        let action = entry
            .spec
            .plan(ctx, state.get(&entry.id))
            .with_context(|| format!("cannot plan resource '{}'", entry.id))?;
        resources.push(PlannedResource::new(
            entry.id.clone(),
            entry.spec.kind().as_str(),
            action,
        ));
    }

    let orphans = if targets.is_empty() {
        state
            .resources
            .keys()
            .filter(|id| manifest.get(id).is_none())
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    Ok(Plan::new(resources).with_orphans(orphans))
}

/// Show what apply would do.
pub fn plan(ctx: &Context, output: &Output, targets: &[String]) -> Result<()> {
    let manifest = load_manifest(ctx)?;
    let state = load_state(ctx)?;
    let plan = build_plan(ctx, &manifest, &state, targets)?;

    if output.json {
        output.json(&PlanReport {
            digest: plan.digest(),
            plan: &plan,
        })?;
    } else {
        output.print(render_plan(&plan, output.verbosity));
    }
    Ok(())
}
