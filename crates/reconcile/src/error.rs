//! Error types for reconciliation.
//!
//! Graph errors (`Cycle`, `UnknownDependency`, `DuplicateResource`) are
//! detected during validation, before any provider call is made. `Provider`
//! wraps an external API failure and carries the identity of the resource
//! being applied so a failed run can be diagnosed without rerunning.

use thiserror::Error;

/// Errors returned by a [`Provider`](crate::Provider) implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the request (bad attributes, unknown kind, ...)
    #[error("rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached or answered too slowly
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// IO error from a provider backed by local storage
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other provider failure
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Whether this failure is typically transient.
    ///
    /// Reconciliation never retries on its own; callers may use this to
    /// decide whether a rerun is worth attempting.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Errors that can occur during a reconcile pass.
#[derive(Debug, Error)]
pub enum Error {
    /// The desired set contains a dependency cycle
    #[error("dependency cycle involving: {}", members.join(", "))]
    Cycle {
        /// Names of the resources that could not be ordered
        members: Vec<String>,
    },

    /// A resource depends on a name not present in the desired set
    #[error("resource '{resource}' depends on unknown resource '{dependency}'")]
    UnknownDependency {
        resource: String,
        dependency: String,
    },

    /// Two resources in the desired set share an identifying name
    #[error("duplicate resource name: '{name}'")]
    DuplicateResource { name: String },

    /// A provider call failed while applying a resource
    #[error("failed to apply {kind} '{name}': {source}")]
    Provider {
        kind: String,
        name: String,
        #[source]
        source: ProviderError,
    },
}

/// Result type for reconcile operations.
pub type Result<T> = std::result::Result<T, Error>;
