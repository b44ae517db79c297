//! Readiness gate: block until a target accepts a control connection.
//!
//! The wait is a blocking poll loop with bounded backoff and a deadline.
//! Transient connection failures are expected while a host boots and are
//! retried; anything else aborts the wait immediately. This is the only
//! place in the crate where retries happen.

use crate::error::{Error, Result};
use crate::target::HostTarget;
use crate::transport::{Session, Transport};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Shared cancellation flag, checked between poll attempts.
///
/// Cancelling never leaves the target in an ambiguous state: the wait only
/// stops between attempts, before any step has run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from another thread.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Poll the target until it is ready, or fail with [`Error::Timeout`].
///
/// Ready means the transport connects and the session announces an identity
/// containing the probe's expected substring. Returns the established
/// session so the caller reuses the connection that proved readiness.
pub fn wait_for_ready<T: Transport>(
    transport: &T,
    target: &HostTarget,
    cancel: &CancelToken,
) -> Result<T::Session> {
    let probe = &target.probe;
    let start = Instant::now();
    let mut delay = probe.interval();
    let mut attempts: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        attempts += 1;
        match transport.connect(target) {
            Ok(session) => {
                if session.identity().contains(&probe.expect) {
                    log::debug!(
                        "{} ready after {} attempt(s) ({:?})",
                        target.address,
                        attempts,
                        start.elapsed()
                    );
                    return Ok(session);
                }
                // Wrong service answered (e.g. a bootloader console); keep
                // polling until the expected identity shows up.
                log::debug!(
                    "{} answered with unexpected identity '{}'",
                    target.address,
                    session.identity()
                );
            }
            Err(e) if e.is_transient() => {
                log::trace!("{} not ready yet: {}", target.address, e);
            }
            Err(e) => return Err(Error::Connect(e)),
        }

        if start.elapsed() >= probe.deadline() {
            return Err(Error::Timeout {
                attempts,
                elapsed: start.elapsed(),
            });
        }

        std::thread::sleep(delay);
        delay = probe.next_delay(delay);
    }
}
