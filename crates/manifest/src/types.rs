//! Declaration file schemas.

use hostrun::{ConfigStep, CredentialRef, ReadinessProbe};
use reconcile::Resource;
use serde::{Deserialize, Serialize};

/// Root of a resources declaration file.
///
/// ```toml
/// [[resources]]
/// kind = "vpc"
/// name = "main"
///
/// [resources.attributes]
/// cidr_block = "10.0.0.0/16"
///
/// [[resources]]
/// kind = "subnet"
/// name = "app"
/// depends_on = ["main"]
///
/// [resources.attributes]
/// cidr_block = "10.0.1.0/24"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSet {
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Where the runner should connect, and how.
///
/// The address comes either from a reconciled resource's state (the handoff)
/// or from an explicit `address`. The credential field is a reference
/// resolved out of band; the secret value never appears in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDecl {
    /// Resource whose state provides the address
    #[serde(default)]
    pub resource: Option<String>,

    /// Attribute key carrying the address on that resource
    #[serde(default = "default_address_attribute")]
    pub address_attribute: String,

    /// Explicit address, bypassing the resource lookup
    #[serde(default)]
    pub address: Option<String>,

    /// Login user for the control connection
    pub user: String,

    /// Credential reference (key path or environment variable name)
    #[serde(default)]
    pub credential: CredentialRef,

    /// Readiness probe parameters
    #[serde(default)]
    pub probe: ReadinessProbe,
}

fn default_address_attribute() -> String {
    "public_ip".to_string()
}

/// Root of a steps declaration file.
///
/// ```toml
/// [target]
/// resource = "web"
/// user = "admin"
/// credential = { key_file = { path = "~/.ssh/id_ed25519" } }
///
/// [[steps]]
/// name = "install_docker"
/// command = "apt-get install -y docker-ce"
/// run_as = "root"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    pub target: TargetDecl,

    #[serde(default)]
    pub steps: Vec<ConfigStep>,
}
