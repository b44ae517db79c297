//! Host targets, credentials, and readiness probe parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reference to a credential supplied out of band.
///
/// Declaration files carry references only; the secret value itself (key
/// material, password) is resolved by the caller at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialRef {
    /// Path to a private key file
    KeyFile { path: String },
    /// Name of an environment variable holding the secret
    Env { var: String },
    /// Ambient agent authentication
    Agent,
}

impl Default for CredentialRef {
    fn default() -> Self {
        Self::Agent
    }
}

/// Parameters for the readiness gate.
///
/// The gate polls at `interval`, stretching by `backoff_factor` up to
/// `max_interval`, until `deadline` has elapsed. A factor of 1.0 keeps the
/// interval fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessProbe {
    /// Substring the session's announced identity must contain
    #[serde(default)]
    pub expect: String,

    /// Initial delay between attempts, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Multiplier applied to the delay after each failed attempt
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Upper bound on the delay, in milliseconds
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Total time budget for the wait, in milliseconds
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

fn default_interval_ms() -> u64 {
    5_000
}

fn default_backoff_factor() -> f64 {
    1.5
}

fn default_max_interval_ms() -> u64 {
    30_000
}

fn default_deadline_ms() -> u64 {
    300_000
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self {
            expect: String::new(),
            interval_ms: default_interval_ms(),
            backoff_factor: default_backoff_factor(),
            max_interval_ms: default_max_interval_ms(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl ReadinessProbe {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Delay to use after the current one, capped at `max_interval`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.mul_f64(self.backoff_factor.max(1.0)).min(self.max_interval())
    }
}

/// A host the runner configures.
///
/// Created once the owning compute resource is provisioned; discarded after
/// the run completes or fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostTarget {
    /// Network address the transport connects to
    pub address: String,

    /// Login user for the control connection
    pub user: String,

    /// Credential reference, never an inline secret
    #[serde(default)]
    pub credential: CredentialRef,

    /// Readiness probe parameters
    #[serde(default)]
    pub probe: ReadinessProbe,
}

impl HostTarget {
    /// Create a target with default credential and probe settings.
    pub fn new(address: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            user: user.into(),
            credential: CredentialRef::default(),
            probe: ReadinessProbe::default(),
        }
    }
}
