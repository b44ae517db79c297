//! Local process transport.
//!
//! Executes step commands on this machine through `sh -c`, applying
//! `run_as` with a `sudo -u` wrapper. This is the "local connection" of the
//! runner: the same interface a secure-shell transport would implement,
//! with the host being the current machine.

use hostrun::{ExecOutput, HostTarget, Session, StepCommand, Transport, TransportError};
use std::process::Command;

const IDENTITY: &str = "fazenda-local";

/// Transport that runs steps on the local machine.
#[derive(Debug, Default)]
pub struct LocalTransport;

impl LocalTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for LocalTransport {
    type Session = LocalSession;

    fn connect(&self, target: &HostTarget) -> Result<LocalSession, TransportError> {
        log::debug!("local session for {} (user {})", target.address, target.user);
        Ok(LocalSession)
    }
}

/// An open local session.
#[derive(Debug)]
pub struct LocalSession;

impl Session for LocalSession {
    fn identity(&self) -> &str {
        IDENTITY
    }

    fn execute(&mut self, command: &StepCommand) -> Result<ExecOutput, TransportError> {
        let output = match &command.run_as {
            Some(user) => Command::new("sudo")
                .args(["-u", user, "sh", "-c", &command.line])
                .output(),
            None => Command::new("sh").args(["-c", &command.line]).output(),
        }
        .map_err(TransportError::Io)?;

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            // None means the process died to a signal
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
