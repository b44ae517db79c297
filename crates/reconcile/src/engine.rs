//! Reconciliation engine: converge actual provider state to the desired set.
//!
//! The engine walks the desired set in topological order with a single-pass
//! worklist. A resource is only processed once every dependency has a
//! snapshot; a failed resource blocks its transitive dependents while
//! independent branches keep going.

use crate::error::Error;
use crate::graph::DependencyGraph;
use crate::provider::Provider;
use crate::resource::Resource;
use crate::state::{ApplyAction, ReconcileOutcome, ResourceState};

/// Converge provider state to the desired set.
///
/// Graph validation (duplicates, unknown dependencies, cycles) happens before
/// any provider call; an invalid set returns an outcome with the error set
/// and nothing applied.
///
/// Applying the same desired set twice with no external drift performs zero
/// mutating provider calls on the second pass.
pub fn reconcile<P: Provider + ?Sized>(
    provider: &mut P,
    desired: &[Resource],
) -> ReconcileOutcome {
    let graph = match DependencyGraph::build(desired) {
        Ok(graph) => graph,
        Err(error) => return ReconcileOutcome { applied: Vec::new(), skipped: Vec::new(), error: Some(error) },
    };
    let order = match graph.topological_order() {
        Ok(order) => order,
        Err(error) => return ReconcileOutcome { applied: Vec::new(), skipped: Vec::new(), error: Some(error) },
    };

    let mut applied = Vec::new();
    let mut skipped = Vec::new();
    let mut first_error: Option<Error> = None;
    let mut blocked = vec![false; desired.len()];

    for i in order {
        let resource = &desired[i];

        if graph.dependencies_of(i).iter().any(|&dep| blocked[dep]) {
            log::warn!(
                "skipping {} '{}': a dependency was not applied",
                resource.kind,
                resource.name
            );
            blocked[i] = true;
            skipped.push(resource.name.clone());
            continue;
        }

        match apply_resource(provider, resource) {
            Ok(state) => {
                if state.action.is_change() {
                    log::info!(
                        "{} '{}': {:?} (id {})",
                        state.kind,
                        state.name,
                        state.action,
                        state.id
                    );
                } else {
                    log::debug!("{} '{}': up to date", state.kind, state.name);
                }
                applied.push(state);
            }
            Err(error) => {
                log::error!("{error}");
                blocked[i] = true;
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
    }

    ReconcileOutcome {
        applied,
        skipped,
        error: first_error,
    }
}

/// Apply a single resource: read, then create / update / replace / no-op.
fn apply_resource<P: Provider + ?Sized>(
    provider: &mut P,
    resource: &Resource,
) -> Result<ResourceState, Error> {
    let kind = resource.kind.as_str();
    let name = resource.name.as_str();
    let wrap = |source| Error::Provider {
        kind: kind.to_string(),
        name: name.to_string(),
        source,
    };

    let observed = provider.read(kind, name).map_err(wrap)?;

    let (observed, action) = match observed {
        None => {
            let created = provider
                .create(kind, name, &resource.attributes)
                .map_err(wrap)?;
            (created, ApplyAction::Created)
        }
        Some(observed) if observed.satisfies(&resource.attributes) => {
            (observed, ApplyAction::Unchanged)
        }
        Some(_) if provider.supports_update(kind) => {
            let updated = provider
                .update(kind, name, &resource.attributes)
                .map_err(wrap)?;
            (updated, ApplyAction::Updated)
        }
        Some(_) => {
            provider.delete(kind, name).map_err(wrap)?;
            let recreated = provider
                .create(kind, name, &resource.attributes)
                .map_err(wrap)?;
            (recreated, ApplyAction::Replaced)
        }
    };

    Ok(ResourceState {
        name: resource.name.clone(),
        kind: resource.kind.clone(),
        id: observed.id,
        attributes: observed.attributes,
        action,
    })
}
