//! Error types for declaration files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur loading, validating, or writing declarations.
#[derive(Debug, Error)]
pub enum Error {
    /// Could not read a declaration file
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write a declaration file
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML
    #[error("invalid TOML in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Serialization failed
    #[error("failed to serialize declarations: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Two resources share an identifying name
    #[error("duplicate resource name: '{name}'")]
    DuplicateResource { name: String },

    /// A dependency names a resource not in the file
    #[error("resource '{resource}' depends on unknown resource '{dependency}'")]
    UnknownDependency {
        resource: String,
        dependency: String,
    },

    /// A required field is empty
    #[error("{what} must not be empty")]
    Empty { what: String },

    /// The playbook target names no address source
    #[error("playbook target needs either an address or a resource to take it from")]
    NoAddress,
}

/// Result type for declaration operations.
pub type Result<T> = std::result::Result<T, Error>;
