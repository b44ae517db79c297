//! Transport capability set for the control channel.
//!
//! The runner consumes a remote control channel (a secure shell, a container
//! exec bridge, a local process shim) as an interface: connect to a target,
//! get a session that announces its identity, execute commands through it.

use crate::error::TransportError;
use crate::target::HostTarget;

/// A command as dispatched to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    /// The command line to execute
    pub line: String,

    /// Effective identity to execute under; `None` means the login user.
    ///
    /// How the identity is applied on the wire (e.g. a `sudo -u` wrapper) is
    /// the transport's concern.
    pub run_as: Option<String>,
}

/// Captured output of an executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecOutput {
    /// Whether the command exited zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// An established control session.
pub trait Session {
    /// Identity string the connected service announced at connect time.
    ///
    /// The readiness gate matches this against the probe's expected
    /// substring before declaring the host ready.
    fn identity(&self) -> &str;

    /// Execute a command and capture its output.
    fn execute(&mut self, command: &StepCommand) -> Result<ExecOutput, TransportError>;
}

/// A way to reach hosts.
pub trait Transport {
    type Session: Session;

    /// Open a control session to the target.
    fn connect(&self, target: &HostTarget) -> Result<Self::Session, TransportError>;
}
