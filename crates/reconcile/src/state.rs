//! Reconciliation outputs: immutable snapshots and the pass outcome.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Action taken for a resource during an apply pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyAction {
    /// Resource did not exist and was created
    Created,
    /// Resource existed and was updated in place
    Updated,
    /// Resource existed and was destroyed and recreated
    Replaced,
    /// Resource already matched the desired attributes
    Unchanged,
}

impl ApplyAction {
    /// Whether the action mutated provider state.
    pub fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Immutable snapshot of a resource after a successful apply.
///
/// The attribute map is the provider's full view, so generated values
/// (identifiers, network addresses) are available to downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    pub name: String,
    pub kind: String,
    /// Provider-assigned identifier
    pub id: String,
    pub attributes: BTreeMap<String, String>,
    pub action: ApplyAction,
}

impl ResourceState {
    /// Look up a single observed attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Per-action counts for an apply pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ApplySummary {
    /// Total number of provider-mutating applications.
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.replaced
    }

    /// Check if the pass completed without failures or skips.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

/// Result of a reconcile pass.
///
/// `applied` holds a snapshot for every resource that reached its desired
/// state (including already-converged ones), in apply order. `skipped` names
/// the resources not processed because a dependency failed. `error` is the
/// first failure, if any; a partial apply reports both so a rerun can resume.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub applied: Vec<ResourceState>,
    pub skipped: Vec<String>,
    pub error: Option<Error>,
}

impl ReconcileOutcome {
    /// Check if every resource reached its desired state.
    pub fn is_converged(&self) -> bool {
        self.error.is_none() && self.skipped.is_empty()
    }

    /// Find the snapshot for a resource by name.
    pub fn state_of(&self, name: &str) -> Option<&ResourceState> {
        self.applied.iter().find(|s| s.name == name)
    }

    /// Summarize the pass.
    pub fn summary(&self) -> ApplySummary {
        let mut summary = ApplySummary {
            skipped: self.skipped.len(),
            failed: usize::from(self.error.is_some()),
            ..ApplySummary::default()
        };
        for state in &self.applied {
            match state.action {
                ApplyAction::Created => summary.created += 1,
                ApplyAction::Updated => summary.updated += 1,
                ApplyAction::Replaced => summary.replaced += 1,
                ApplyAction::Unchanged => summary.unchanged += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let snapshot = |name: &str, action| ResourceState {
            name: name.to_string(),
            kind: "vpc".to_string(),
            id: format!("vpc-{name}"),
            attributes: BTreeMap::new(),
            action,
        };

        let outcome = ReconcileOutcome {
            applied: vec![
                snapshot("a", ApplyAction::Created),
                snapshot("b", ApplyAction::Unchanged),
                snapshot("c", ApplyAction::Replaced),
            ],
            skipped: vec!["d".to_string()],
            error: None,
        };

        let summary = outcome.summary();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.replaced, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total_changes(), 2);
        assert!(!summary.is_success());
        assert!(!outcome.is_converged());
    }
}
