//! # Hostrun
//!
//! A readiness-gated host configuration runner.
//!
//! Given a target host and an ordered list of configuration steps, the
//! runner blocks until the host accepts a control connection and announces
//! the expected identity, then executes the steps strictly in order,
//! failing fast on the first error.
//!
//! ## Core Concepts
//!
//! - **HostTarget**: address + login user + credential reference + readiness
//!   probe parameters
//! - **ConfigStep**: one ordered unit of configuration, optionally under a
//!   different identity
//! - **Transport / Session**: the control channel consumed as an interface
//!   (a secure shell, a container exec bridge, a local shim)
//! - **Runner**: the WAITING → READY → RUNNING → DONE state machine
//!
//! ## Example
//!
//! ```ignore
//! use hostrun::{ConfigStep, HostTarget, Runner};
//!
//! let target = HostTarget::new("203.0.113.10", "admin");
//! let steps = vec![
//!     ConfigStep::new("install_docker", "apt-get install -y docker-ce"),
//!     ConfigStep::new("start_containers", "docker compose up -d").run_as("deploy"),
//! ];
//!
//! let report = Runner::new().run(&transport, &target, &steps)?;
//! println!("{} steps completed", report.completed());
//! ```
//!
//! Retries happen only inside the readiness gate; a failed step is never
//! rerun and nothing is rolled back.

pub mod error;
pub mod readiness;
pub mod runner;
pub mod step;
pub mod target;
pub mod transport;

// Re-export main types at crate root
pub use error::{Error, Result, TransportError};
pub use readiness::{CancelToken, wait_for_ready};
pub use runner::{Phase, RunReport, Runner, StepOutcome};
pub use step::ConfigStep;
pub use target::{CredentialRef, HostTarget, ReadinessProbe};
pub use transport::{ExecOutput, Session, StepCommand, Transport};
