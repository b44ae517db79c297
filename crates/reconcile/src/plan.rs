//! Read-only planning: what an apply pass would change.

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::provider::{Observed, Provider};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// The operation an apply pass would perform for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedChange {
    /// Resource is absent and would be created
    Create,
    /// Resource drifted and would be updated in place
    Update,
    /// Resource drifted and its kind has no in-place update
    Replace,
    /// Resource already matches the desired attributes
    Noop,
}

impl PlannedChange {
    /// Whether this change would mutate provider state.
    pub fn is_change(self) -> bool {
        !matches!(self, Self::Noop)
    }
}

/// A planned operation for a single resource, in apply order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub name: String,
    pub kind: String,
    pub change: PlannedChange,
}

/// Decide what to do for a resource given its observed state.
fn classify<P: Provider + ?Sized>(
    provider: &P,
    resource: &Resource,
    observed: Option<&Observed>,
) -> PlannedChange {
    match observed {
        None => PlannedChange::Create,
        Some(o) if o.satisfies(&resource.attributes) => PlannedChange::Noop,
        Some(_) if provider.supports_update(&resource.kind) => PlannedChange::Update,
        Some(_) => PlannedChange::Replace,
    }
}

/// Compute the operations an apply pass would perform, in dependency order.
///
/// Only issues `read` calls; provider state is untouched. Graph errors are
/// reported the same way [`reconcile`](crate::reconcile) reports them.
pub fn plan<P: Provider + ?Sized>(
    provider: &P,
    desired: &[Resource],
) -> Result<Vec<PlannedAction>> {
    let graph = DependencyGraph::build(desired)?;
    let order = graph.topological_order()?;

    let mut actions = Vec::with_capacity(desired.len());
    for i in order {
        let resource = &desired[i];
        let observed = provider
            .read(&resource.kind, &resource.name)
            .map_err(|source| Error::Provider {
                kind: resource.kind.clone(),
                name: resource.name.clone(),
                source,
            })?;
        actions.push(PlannedAction {
            name: resource.name.clone(),
            kind: resource.kind.clone(),
            change: classify(provider, resource, observed.as_ref()),
        });
    }

    Ok(actions)
}
