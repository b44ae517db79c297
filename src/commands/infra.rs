//! Infrastructure commands: status, plan, apply.

use crate::Context;
use crate::cli::{ApplyArgs, PlanArgs, StatusArgs};
use crate::config;
use crate::provider::LocalProvider;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use manifest::ResourceSet;
use reconcile::{PlannedAction, PlannedChange, Provider, ReconcileOutcome};
use std::path::Path;

pub(crate) fn load_set(path: &Path) -> Result<ResourceSet> {
    manifest::load_resources(path)
        .with_context(|| format!("Failed to load resources from {}", path.display()))
}

pub(crate) fn open_provider(state_override: Option<&Path>) -> Result<LocalProvider> {
    LocalProvider::open(&config::state_file(state_override)?)
}

/// Show provider state vs the declared resources.
pub fn status(_ctx: &Context, args: &StatusArgs, state_override: Option<&Path>) -> Result<()> {
    let set = load_set(&args.resources)?;
    let provider = open_provider(state_override)?;

    let mut rows = Vec::with_capacity(set.resources.len());
    for resource in &set.resources {
        let observed = provider
            .read(&resource.kind, &resource.name)
            .with_context(|| format!("Failed to read state of '{}'", resource.name))?;
        let (status, id) = match observed {
            None => ("absent", None),
            Some(o) if o.satisfies(&resource.attributes) => ("present", Some(o.id)),
            Some(o) => ("drifted", Some(o.id)),
        };
        rows.push((resource, status, id));
    }

    if args.json {
        let json: Vec<_> = rows
            .iter()
            .map(|(resource, status, id)| {
                serde_json::json!({
                    "name": resource.name,
                    "kind": resource.kind,
                    "status": status,
                    "id": id,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    ui::header("Resources");
    for (resource, status, id) in &rows {
        let glyph = match *status {
            "present" => "✓".green(),
            "drifted" => "~".yellow(),
            _ => "✗".red(),
        };
        let id = id.as_deref().unwrap_or("-");
        println!(
            "  {} {} '{}' {} {}",
            glyph,
            resource.kind,
            resource.name,
            status.dimmed(),
            id.dimmed()
        );
    }

    let declared: Vec<&str> = set.resources.iter().map(|r| r.name.as_str()).collect();
    let unmanaged: Vec<String> = provider
        .records()
        .filter(|r| !declared.contains(&r.name.as_str()))
        .map(|r| format!("{} '{}'", r.kind, r.name))
        .collect();
    if !unmanaged.is_empty() {
        ui::warn(&format!("not declared but recorded: {}", unmanaged.join(", ")));
    }

    Ok(())
}

/// Preview what apply would change.
pub fn plan(ctx: &Context, args: &PlanArgs, state_override: Option<&Path>) -> Result<()> {
    let set = load_set(&args.resources)?;
    let provider = open_provider(state_override)?;

    let actions = reconcile::plan(&provider, &set.resources)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
        return Ok(());
    }

    print_actions(ctx, &actions);
    let pending = actions.iter().filter(|a| a.change.is_change()).count();
    if pending == 0 {
        ui::success("Nothing to do, state matches the declarations");
    } else {
        ui::info(&format!("{pending} change(s) pending"));
    }
    Ok(())
}

fn print_actions(ctx: &Context, actions: &[PlannedAction]) {
    if ctx.quiet {
        return;
    }
    for action in actions {
        let line = format!("{} '{}'", action.kind, action.name);
        match action.change {
            PlannedChange::Create => println!("  {} {}", "+".green().bold(), line),
            PlannedChange::Update => println!("  {} {}", "~".yellow().bold(), line),
            PlannedChange::Replace => println!("  {} {}", "!".red().bold(), line),
            PlannedChange::Noop => println!("  {} {}", "·".dimmed(), line.dimmed()),
        }
    }
}

/// What happened to an apply request before/after reconciliation.
pub(crate) enum ApplyDisposition {
    /// State already matched the declarations
    Converged,
    /// A reconcile pass ran
    Applied(ReconcileOutcome),
    /// The user declined the confirmation prompt
    Declined,
    /// Dry run requested, nothing touched
    DryRun,
}

/// Plan, confirm, and reconcile a resource set.
pub(crate) fn apply_set(
    ctx: &Context,
    provider: &mut LocalProvider,
    set: &ResourceSet,
    dry_run: bool,
    yes: bool,
) -> Result<ApplyDisposition> {
    let actions = reconcile::plan(provider, &set.resources)?;
    let pending = actions.iter().filter(|a| a.change.is_change()).count();

    if pending == 0 {
        ui::success("Nothing to do, state matches the declarations");
        return Ok(ApplyDisposition::Converged);
    }

    print_actions(ctx, &actions);

    if dry_run {
        ui::info(&format!("{pending} change(s) would be applied"));
        return Ok(ApplyDisposition::DryRun);
    }

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Apply {pending} change(s)?"))
            .default(false)
            .interact()
            .context("Confirmation prompt failed")?;
        if !confirmed {
            return Ok(ApplyDisposition::Declined);
        }
    }

    Ok(ApplyDisposition::Applied(reconcile::reconcile(
        provider,
        &set.resources,
    )))
}

/// Print an outcome and propagate a partial-apply failure.
pub(crate) fn report_outcome(outcome: ReconcileOutcome) -> Result<()> {
    let summary = outcome.summary();

    for name in &outcome.skipped {
        ui::warn(&format!("skipped '{name}': a dependency was not applied"));
    }

    if let Some(error) = outcome.error {
        ui::error(&format!(
            "applied {} resource(s) before failing; rerun apply to resume",
            outcome.applied.len()
        ));
        return Err(error.into());
    }

    ui::success(&format!(
        "{} created, {} updated, {} replaced, {} unchanged",
        summary.created, summary.updated, summary.replaced, summary.unchanged
    ));
    Ok(())
}

/// Converge provider state to the declared resources.
pub fn apply(ctx: &Context, args: &ApplyArgs, state_override: Option<&Path>) -> Result<()> {
    let set = load_set(&args.resources)?;
    let mut provider = open_provider(state_override)?;

    match apply_set(ctx, &mut provider, &set, args.dry_run, args.yes)? {
        ApplyDisposition::Applied(outcome) => report_outcome(outcome),
        ApplyDisposition::Declined => {
            ui::warn("Aborted");
            Ok(())
        }
        ApplyDisposition::Converged | ApplyDisposition::DryRun => Ok(()),
    }
}
