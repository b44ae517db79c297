//! Full flow: reconcile the resources, then configure the provisioned host.
//!
//! The two halves share nothing at runtime; the only thing that crosses is
//! the compute resource's address, read back from provider state after the
//! apply pass.

use crate::Context;
use crate::cli::UpArgs;
use crate::commands::infra::{self, ApplyDisposition};
use crate::commands::run;
use crate::ui;
use anyhow::Result;
use std::path::Path;

pub fn up(ctx: &Context, args: &UpArgs, state_override: Option<&Path>) -> Result<()> {
    let set = infra::load_set(&args.resources)?;
    let playbook = run::load_playbook(&args.playbook)?;
    let mut provider = infra::open_provider(state_override)?;

    match infra::apply_set(ctx, &mut provider, &set, false, args.yes)? {
        ApplyDisposition::Applied(outcome) => {
            // A partial apply aborts here; no step runs against a half-built
            // stack.
            infra::report_outcome(outcome)?;
        }
        ApplyDisposition::Declined => {
            ui::warn("Aborted");
            return Ok(());
        }
        ApplyDisposition::Converged | ApplyDisposition::DryRun => {}
    }

    let address = run::address_for(&playbook, &provider)?;
    run::run_playbook(ctx, &playbook, address)
}
