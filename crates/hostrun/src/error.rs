//! Error types for host configuration runs.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The target refused the connection (expected while booting)
    #[error("connection refused: {0}")]
    Refused(String),

    /// Authentication with the supplied credential failed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// IO error on the control channel
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether this failure is expected to clear up on its own.
    ///
    /// Only transient failures are retried by the readiness gate; anything
    /// else aborts the wait immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Refused(_) | Self::Io(_))
    }
}

/// Errors that can occur during a run.
///
/// `Step` and `Transport` carry the index of the failing step, so the last
/// successful step is always `index - 1` (or none when `index` is 0).
#[derive(Debug, Error)]
pub enum Error {
    /// The readiness deadline elapsed before the host accepted a connection
    #[error("host not ready after {attempts} attempts over {elapsed:?}")]
    Timeout { attempts: u32, elapsed: Duration },

    /// The wait or run was cancelled through the cancel token
    #[error("run cancelled")]
    Cancelled,

    /// A non-transient connection failure ended the wait
    #[error("connection failed: {0}")]
    Connect(#[source] TransportError),

    /// A configuration step exited non-zero
    #[error("step {index} '{name}' failed with exit code {exit_code}")]
    Step {
        index: usize,
        name: String,
        exit_code: i32,
        /// Captured standard error of the failing command
        stderr: String,
    },

    /// The control channel broke while executing a step
    #[error("transport error during step {index} '{name}': {source}")]
    Transport {
        index: usize,
        name: String,
        #[source]
        source: TransportError,
    },
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, Error>;
