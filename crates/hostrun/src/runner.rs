//! Sequential step runner with readiness gating.
//!
//! A run moves through an explicit state machine: WAITING until the host
//! accepts a control connection, then RUNNING the steps strictly in order,
//! ending in DONE or FAILED. Steps never execute concurrently; later steps
//! may depend on side effects (created users, installed packages) of earlier
//! ones. There is no rollback: a failed step ends the run and leaves the
//! host as the steps left it.

use crate::error::{Error, Result};
use crate::readiness::{CancelToken, wait_for_ready};
use crate::step::ConfigStep;
use crate::target::HostTarget;
use crate::transport::{ExecOutput, Session, StepCommand, Transport};

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Ready,
    Running,
    Done,
    Failed,
}

/// Outcome of one executed step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub name: String,
    /// Identity the step ran as
    pub identity: String,
    pub output: ExecOutput,
}

/// Report for a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Per-step outcomes, in execution order
    pub outcomes: Vec<StepOutcome>,
}

impl RunReport {
    /// Number of steps that completed.
    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }
}

/// Readiness-gated sequential runner.
pub struct Runner {
    cancel: CancelToken,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            cancel: CancelToken::new(),
        }
    }

    /// Create a runner sharing an external cancel token.
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    /// Token that cancels this runner's wait and run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the target to become ready, then execute steps in order.
    ///
    /// Fails fast: the first step that exits non-zero ends the run with
    /// [`Error::Step`]; remaining steps never execute. On failure the index
    /// in the error gives the last successful step (`index - 1`).
    pub fn run<T: Transport>(
        &self,
        transport: &T,
        target: &HostTarget,
        steps: &[ConfigStep],
    ) -> Result<RunReport> {
        let mut phase = Phase::Waiting;
        log::info!(
            "waiting for {} (deadline {:?})",
            target.address,
            target.probe.deadline()
        );

        let mut session = match wait_for_ready(transport, target, &self.cancel) {
            Ok(session) => session,
            Err(e) => {
                advance(&mut phase, Phase::Failed);
                return Err(e);
            }
        };
        advance(&mut phase, Phase::Ready);

        advance(&mut phase, Phase::Running);
        let mut outcomes = Vec::with_capacity(steps.len());
        // The login user is the identity until a step switches it.
        let mut effective: Option<String> = None;

        for (index, step) in steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                advance(&mut phase, Phase::Failed);
                return Err(Error::Cancelled);
            }

            if let Some(user) = &step.run_as {
                effective = if *user == target.user {
                    None
                } else {
                    Some(user.clone())
                };
            }

            let identity = effective.clone().unwrap_or_else(|| target.user.clone());
            log::info!("step {}/{}: {} (as {})", index + 1, steps.len(), step.name, identity);

            let command = StepCommand {
                line: step.command.clone(),
                run_as: effective.clone(),
            };
            let output = match session.execute(&command) {
                Ok(output) => output,
                Err(source) => {
                    advance(&mut phase, Phase::Failed);
                    return Err(Error::Transport {
                        index,
                        name: step.name.clone(),
                        source,
                    });
                }
            };

            if !output.success() {
                advance(&mut phase, Phase::Failed);
                log::error!(
                    "step '{}' exited {}: {}",
                    step.name,
                    output.exit_code,
                    output.stderr.trim()
                );
                return Err(Error::Step {
                    index,
                    name: step.name.clone(),
                    exit_code: output.exit_code,
                    stderr: output.stderr,
                });
            }

            outcomes.push(StepOutcome {
                name: step.name.clone(),
                identity,
                output,
            });
        }

        advance(&mut phase, Phase::Done);
        Ok(RunReport { outcomes })
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    log::debug!("runner phase {phase:?} -> {next:?}");
    *phase = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::target::ReadinessProbe;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Transport that becomes ready after a set number of connect attempts.
    struct MockTransport {
        ready_after: u32,
        attempts: Cell<u32>,
        identity: String,
        /// Commands whose execution exits non-zero
        fail_commands: Vec<String>,
        executed: Rc<RefCell<Vec<StepCommand>>>,
    }

    impl MockTransport {
        fn ready() -> Self {
            Self::ready_after(0)
        }

        fn ready_after(attempts: u32) -> Self {
            Self {
                ready_after: attempts,
                attempts: Cell::new(0),
                identity: "OpenSSH_9.6".to_string(),
                fail_commands: Vec::new(),
                executed: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn with_identity(mut self, identity: &str) -> Self {
            self.identity = identity.to_string();
            self
        }

        fn failing_on(mut self, command: &str) -> Self {
            self.fail_commands.push(command.to_string());
            self
        }

        fn executed(&self) -> Vec<StepCommand> {
            self.executed.borrow().clone()
        }
    }

    struct MockSession {
        identity: String,
        fail_commands: Vec<String>,
        executed: Rc<RefCell<Vec<StepCommand>>>,
    }

    impl Session for MockSession {
        fn identity(&self) -> &str {
            &self.identity
        }

        fn execute(&mut self, command: &StepCommand) -> std::result::Result<ExecOutput, TransportError> {
            self.executed.borrow_mut().push(command.clone());
            if self.fail_commands.iter().any(|f| command.line.contains(f)) {
                return Ok(ExecOutput {
                    stdout: String::new(),
                    stderr: "useradd: cannot lock /etc/passwd".to_string(),
                    exit_code: 1,
                });
            }
            Ok(ExecOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: 0,
            })
        }
    }

    impl Transport for MockTransport {
        type Session = MockSession;

        fn connect(&self, _target: &HostTarget) -> std::result::Result<MockSession, TransportError> {
            let attempt = self.attempts.get();
            self.attempts.set(attempt + 1);
            if attempt < self.ready_after {
                return Err(TransportError::Refused("connect: refused".to_string()));
            }
            Ok(MockSession {
                identity: self.identity.clone(),
                fail_commands: self.fail_commands.clone(),
                executed: self.executed.clone(),
            })
        }
    }

    fn fast_target() -> HostTarget {
        let mut target = HostTarget::new("203.0.113.10", "admin");
        target.probe = ReadinessProbe {
            expect: "OpenSSH".to_string(),
            interval_ms: 1,
            backoff_factor: 1.0,
            max_interval_ms: 1,
            deadline_ms: 200,
        };
        target
    }

    fn docker_steps() -> Vec<ConfigStep> {
        vec![
            ConfigStep::new("wait_for_ssh", "true"),
            ConfigStep::new("install_docker", "apt-get install -y docker-ce"),
            ConfigStep::new("create_user", "useradd -m deploy"),
            ConfigStep::new("install_compose", "curl -o /usr/local/bin/docker-compose"),
            ConfigStep::new("start_containers", "docker compose up -d"),
        ]
    }

    #[test]
    fn test_runs_all_steps_in_order() {
        let transport = MockTransport::ready();
        let report = Runner::new()
            .run(&transport, &fast_target(), &docker_steps())
            .unwrap();

        assert_eq!(report.completed(), 5);
        let lines: Vec<String> = transport.executed().iter().map(|c| c.line.clone()).collect();
        assert_eq!(lines[0], "true");
        assert_eq!(lines[4], "docker compose up -d");
    }

    #[test]
    fn test_waits_until_host_is_ready() {
        let transport = MockTransport::ready_after(3);
        let report = Runner::new()
            .run(&transport, &fast_target(), &docker_steps())
            .unwrap();

        assert_eq!(report.completed(), 5);
        assert_eq!(transport.attempts.get(), 4);
    }

    #[test]
    fn test_timeout_executes_no_steps() {
        let transport = MockTransport::ready_after(u32::MAX);
        let err = Runner::new()
            .run(&transport, &fast_target(), &docker_steps())
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { attempts, .. } if attempts > 0));
        assert!(transport.executed().is_empty());
    }

    #[test]
    fn test_unexpected_identity_keeps_polling_until_timeout() {
        let transport = MockTransport::ready().with_identity("telnetd 1.2");
        let err = Runner::new()
            .run(&transport, &fast_target(), &docker_steps())
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }));
        assert!(transport.executed().is_empty());
    }

    #[test]
    fn test_step_failure_stops_the_run() {
        let transport = MockTransport::ready().failing_on("useradd");
        let err = Runner::new()
            .run(&transport, &fast_target(), &docker_steps())
            .unwrap_err();

        match err {
            Error::Step { index, ref name, exit_code, .. } => {
                assert_eq!(index, 2);
                assert_eq!(name, "create_user");
                assert_eq!(exit_code, 1);
            }
            ref other => panic!("expected step error, got {other:?}"),
        }
        // install_compose and start_containers never ran.
        assert_eq!(transport.executed().len(), 3);
    }

    #[test]
    fn test_run_as_switches_and_persists_identity() {
        let transport = MockTransport::ready();
        let steps = vec![
            ConfigStep::new("as_login", "id"),
            ConfigStep::new("switch", "docker ps").run_as("deploy"),
            ConfigStep::new("inherits", "docker compose up -d"),
            ConfigStep::new("back_to_login", "id").run_as("admin"),
        ];

        let report = Runner::new().run(&transport, &fast_target(), &steps).unwrap();

        let run_as: Vec<Option<String>> =
            transport.executed().iter().map(|c| c.run_as.clone()).collect();
        assert_eq!(
            run_as,
            vec![
                None,
                Some("deploy".to_string()),
                Some("deploy".to_string()),
                // run_as naming the login user maps back to the plain session
                None,
            ]
        );
        assert_eq!(report.outcomes[2].identity, "deploy");
        assert_eq!(report.outcomes[3].identity, "admin");
    }

    #[test]
    fn test_cancelled_token_aborts_before_connecting() {
        let transport = MockTransport::ready();
        let runner = Runner::new();
        runner.cancel_token().cancel();

        let err = runner
            .run(&transport, &fast_target(), &docker_steps())
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(transport.attempts.get(), 0);
    }

    #[test]
    fn test_auth_failure_is_not_retried() {
        struct AuthFailTransport {
            attempts: Cell<u32>,
        }

        impl Transport for AuthFailTransport {
            type Session = MockSession;

            fn connect(
                &self,
                _target: &HostTarget,
            ) -> std::result::Result<MockSession, TransportError> {
                self.attempts.set(self.attempts.get() + 1);
                Err(TransportError::Auth("bad key".to_string()))
            }
        }

        let transport = AuthFailTransport {
            attempts: Cell::new(0),
        };
        let err = Runner::new()
            .run(&transport, &fast_target(), &docker_steps())
            .unwrap_err();

        assert!(matches!(err, Error::Connect(TransportError::Auth(_))));
        assert_eq!(transport.attempts.get(), 1);
    }
}
