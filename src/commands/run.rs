//! Playbook execution with readiness gating.

use crate::Context;
use crate::cli::RunArgs;
use crate::config;
use crate::provider::LocalProvider;
use crate::transport::LocalTransport;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result};
use hostrun::{HostTarget, Runner};
use manifest::Playbook;
use std::path::Path;
use std::time::Duration;

pub(crate) fn load_playbook(path: &Path) -> Result<Playbook> {
    manifest::load_playbook(path)
        .with_context(|| format!("Failed to load playbook from {}", path.display()))
}

/// Execute playbook steps against a host, gated on readiness.
pub fn run(ctx: &Context, args: &RunArgs, state_override: Option<&Path>) -> Result<()> {
    let playbook = load_playbook(&args.playbook)?;

    let address = match &args.host {
        Some(host) => host.clone(),
        None => {
            let provider = LocalProvider::open(&config::state_file(state_override)?)?;
            address_for(&playbook, &provider)?
        }
    };

    run_playbook(ctx, &playbook, address)
}

/// Resolve the target address from reconciled provider state (the handoff).
pub(crate) fn address_for(playbook: &Playbook, provider: &LocalProvider) -> Result<String> {
    if let Some(address) = &playbook.target.address {
        return Ok(address.clone());
    }

    // Playbook validation guarantees a resource name when no address is set.
    let name = playbook
        .target
        .resource
        .as_ref()
        .context("playbook target has no address source")?;
    let record = provider.find_by_name(name).with_context(|| {
        format!("resource '{name}' has no recorded state; run apply first")
    })?;
    record
        .attributes
        .get(&playbook.target.address_attribute)
        .cloned()
        .with_context(|| {
            format!(
                "resource '{name}' has no '{}' attribute",
                playbook.target.address_attribute
            )
        })
}

/// Wait for the host, then run the steps.
pub(crate) fn run_playbook(ctx: &Context, playbook: &Playbook, address: String) -> Result<()> {
    // Resolve the credential reference up front so a bad reference fails
    // before the wait, not after it.
    let credential = config::resolve_credential(&playbook.target.credential)?;
    log::debug!("using credential {credential:?}");

    let target = HostTarget {
        address: address.clone(),
        user: playbook.target.user.clone(),
        credential: playbook.target.credential.clone(),
        probe: playbook.target.probe.clone(),
    };

    if !ctx.quiet {
        ui::header(&format!("Configuring {address}"));
    }

    let spinner = if ctx.quiet {
        None
    } else {
        let spinner = indicatif::ProgressBar::new_spinner();
        spinner.set_message(format!("waiting for {address}"));
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    };

    let transport = LocalTransport::new();
    let runner = Runner::new();
    let result = runner.run(&transport, &target, &playbook.steps);

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match result {
        Ok(report) => {
            if !ctx.quiet {
                for (i, outcome) in report.outcomes.iter().enumerate() {
                    ui::step(
                        i + 1,
                        report.completed(),
                        &format!("{} (as {})", outcome.name, outcome.identity),
                    );
                    if ctx.verbose > 0 && !outcome.output.stdout.trim().is_empty() {
                        ui::dim(outcome.output.stdout.trim());
                    }
                }
            }
            ui::success(&format!("{} step(s) completed", report.completed()));
            Ok(())
        }
        Err(hostrun::Error::Step {
            index,
            name,
            exit_code,
            stderr,
        }) => {
            ui::error(&format!(
                "step '{name}' failed after {index} successful step(s)"
            ));
            if !stderr.trim().is_empty() {
                ui::dim(stderr.trim());
            }
            Err(hostrun::Error::Step {
                index,
                name,
                exit_code,
                stderr,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}
