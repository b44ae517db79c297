//! Configuration steps.

use serde::{Deserialize, Serialize};

/// One ordered unit of host configuration.
///
/// Steps are immutable once loaded and execute strictly in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigStep {
    /// Step name, used in reports and errors
    pub name: String,

    /// Command line dispatched through the session
    pub command: String,

    /// Identity to run as.
    ///
    /// Setting this switches the effective identity for this step and every
    /// step after it, until another step switches again. Steps without it
    /// inherit whatever identity is in effect.
    #[serde(default)]
    pub run_as: Option<String>,

    /// Whether rerunning this step is expected to be safe.
    ///
    /// Informational: the runner never reruns steps on its own, but reports
    /// can flag non-idempotent steps after a partial run.
    #[serde(default = "default_idempotent")]
    pub idempotent: bool,
}

fn default_idempotent() -> bool {
    true
}

impl ConfigStep {
    /// Create a step running as the login user.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            run_as: None,
            idempotent: true,
        }
    }

    /// Set the identity this step (and later steps) run as.
    pub fn run_as(mut self, user: impl Into<String>) -> Self {
        self.run_as = Some(user.into());
        self
    }

    /// Mark the step as not safe to rerun.
    pub fn not_idempotent(mut self) -> Self {
        self.idempotent = false;
        self
    }
}
