// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate state machine with a single rearmable auto-close deadline
//!
//! All state changes and every actuator command happen under one async lock,
//! so commands reach the actuator strictly one at a time. The close deadline
//! lives in a `watch` slot read by a single background task; moving the
//! deadline is a slot write, never a new timer. Deadlines are measured on the
//! gate's own clock, both when they are set and when they are checked.

use crate::error::GateError;
use gate_adapters::{ActuatorClient, ActuatorError, GateCommand};
use gate_core::{Clock, GateAction, SystemClock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Physical gate state as far as the controller knows it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Closed,
    Open,
    /// A command is in flight, or the last one failed and the position is
    /// unknown
    Transitioning,
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Closed => "CLOSED",
            GateState::Open => "OPEN",
            GateState::Transitioning => "TRANSITIONING",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSnapshot {
    pub state: GateState,
    pub open_until: Option<Instant>,
}

/// Outcome of a deadline check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineCheck {
    /// No deadline is set
    Idle,
    /// The deadline moved later; the scheduler waits for the new instant
    Rescheduled(Instant),
    /// The deadline elapsed and the gate closed
    Closed,
    /// The deadline elapsed but the close command failed
    Failed,
}

#[derive(Debug)]
struct Inner {
    state: GateState,
    /// Only set while `state` is `Open`
    open_until: Option<Instant>,
}

struct Shared<A, C> {
    actuator: A,
    clock: C,
    actuator_timeout: Duration,
    inner: Mutex<Inner>,
    in_flight: AtomicBool,
    deadline: watch::Sender<Option<Instant>>,
}

/// Clears the in-flight flag even if the command future is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<A: ActuatorClient, C: Clock> Shared<A, C> {
    fn arm(&self, at: Option<Instant>) {
        self.deadline.send_if_modified(|slot| {
            if *slot == at {
                false
            } else {
                *slot = at;
                true
            }
        });
    }

    /// Issue one actuator command. The caller holds the gate lock.
    async fn command(&self, inner: &mut Inner, command: GateCommand) -> Result<(), GateError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::error!(%command, "actuator command issued while another is in flight");
            return Err(GateError::InvariantViolation(format!(
                "{} issued while another command is in flight",
                command
            )));
        }
        let _guard = InFlightGuard(&self.in_flight);

        let from = inner.state;
        inner.state = GateState::Transitioning;

        let result =
            match tokio::time::timeout(self.actuator_timeout, command.send(&self.actuator)).await {
                Ok(result) => result,
                Err(_) => Err(ActuatorError::Timeout(self.actuator_timeout)),
            };

        match result {
            Ok(()) => {
                inner.state = match command {
                    GateCommand::Open => GateState::Open,
                    GateCommand::Close => GateState::Closed,
                };
                tracing::info!(%from, to = %inner.state, "gate transition");
                Ok(())
            }
            Err(source) => {
                tracing::error!(
                    %command,
                    error = %source,
                    "actuator command failed, gate position unknown"
                );
                Err(GateError::Actuator { command, source })
            }
        }
    }

    async fn check_deadline(&self) -> DeadlineCheck {
        let mut inner = self.inner.lock().await;
        let Some(until) = inner.open_until else {
            return DeadlineCheck::Idle;
        };

        if self.clock.now() < until {
            self.arm(Some(until));
            return DeadlineCheck::Rescheduled(until);
        }

        inner.open_until = None;
        self.arm(None);
        match self.command(&mut inner, GateCommand::Close).await {
            Ok(()) => DeadlineCheck::Closed,
            Err(e) => {
                tracing::warn!(error = %e, "auto-close failed");
                DeadlineCheck::Failed
            }
        }
    }
}

/// Owns the actuator and serializes every command sent to it.
///
/// Cloning yields another handle to the same gate.
pub struct GateStateMachine<A: ActuatorClient, C: Clock = SystemClock> {
    shared: Arc<Shared<A, C>>,
    scheduler: Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl<A: ActuatorClient, C: Clock> Clone for GateStateMachine<A, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl<A: ActuatorClient> GateStateMachine<A> {
    /// Create a closed gate on the system clock and start its close
    /// scheduler.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(actuator: A, actuator_timeout: Duration) -> Self {
        Self::with_clock(actuator, actuator_timeout, SystemClock)
    }
}

impl<A: ActuatorClient, C: Clock> GateStateMachine<A, C> {
    /// Create a closed gate whose deadlines follow `clock`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_clock(actuator: A, actuator_timeout: Duration, clock: C) -> Self {
        let (deadline, receiver) = watch::channel(None);
        let shared = Arc::new(Shared {
            actuator,
            clock: clock.clone(),
            actuator_timeout,
            inner: Mutex::new(Inner {
                state: GateState::Closed,
                open_until: None,
            }),
            in_flight: AtomicBool::new(false),
            deadline,
        });
        let handle = tokio::spawn(run_scheduler(Arc::downgrade(&shared), receiver, clock));

        Self {
            shared,
            scheduler: Arc::new(std::sync::Mutex::new(Some(handle))),
        }
    }

    /// Open the gate until at least `open_duration` from now.
    ///
    /// An open gate only has its deadline moved later; no command is sent.
    pub async fn authorize(&self, open_duration: Duration) -> Result<GateAction, GateError> {
        let mut inner = self.shared.inner.lock().await;
        let now = self.shared.clock.now();
        let until = now
            .checked_add(open_duration)
            .ok_or(GateError::WindowOverflow(open_duration))?;

        if inner.state == GateState::Open {
            let extended = inner.open_until.map_or(until, |current| current.max(until));
            inner.open_until = Some(extended);
            self.shared.arm(Some(extended));
            tracing::debug!(
                remaining_ms = extended.saturating_duration_since(now).as_millis() as u64,
                "open window extended"
            );
            return Ok(GateAction::Extend);
        }

        self.shared.command(&mut inner, GateCommand::Open).await?;
        inner.open_until = Some(until);
        self.shared.arm(Some(until));
        Ok(GateAction::Open)
    }

    /// Close the gate unless a still-valid authorization holds it open.
    pub async fn deny(&self) -> Result<GateAction, GateError> {
        let mut inner = self.shared.inner.lock().await;
        let now = self.shared.clock.now();

        match (inner.state, inner.open_until) {
            (GateState::Closed, _) => return Ok(GateAction::None),
            (GateState::Open, Some(until)) if now < until => {
                tracing::info!(
                    remaining_ms = until.saturating_duration_since(now).as_millis() as u64,
                    "deny ignored, gate held open by an earlier authorization"
                );
                return Ok(GateAction::None);
            }
            _ => {}
        }

        inner.open_until = None;
        self.shared.arm(None);
        self.shared.command(&mut inner, GateCommand::Close).await?;
        Ok(GateAction::Close)
    }

    /// Close if the deadline has elapsed, otherwise report the pending one.
    ///
    /// The scheduler calls this on every wake; the deadline is re-read under
    /// the lock, so a wake for a stale instant is harmless.
    pub async fn check_deadline(&self) -> DeadlineCheck {
        self.shared.check_deadline().await
    }

    /// Cancel any deadline and close regardless of state
    pub async fn force_close(&self) -> Result<GateAction, GateError> {
        let mut inner = self.shared.inner.lock().await;
        inner.open_until = None;
        self.shared.arm(None);
        self.shared.command(&mut inner, GateCommand::Close).await?;
        Ok(GateAction::Close)
    }

    /// Stop the close scheduler. Pending deadlines no longer fire.
    pub fn stop(&self) {
        let handle = self
            .scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    pub async fn snapshot(&self) -> GateSnapshot {
        let inner = self.shared.inner.lock().await;
        GateSnapshot {
            state: inner.state,
            open_until: inner.open_until,
        }
    }
}

/// Single close timer for one gate.
///
/// Sleeps until `clock` reaches the instant in the slot, or until the slot
/// changes. A clock that runs behind tokio time is polled again after the
/// remaining interval. Exits once every gate handle is gone.
async fn run_scheduler<A: ActuatorClient, C: Clock>(
    shared: Weak<Shared<A, C>>,
    mut deadline: watch::Receiver<Option<Instant>>,
    clock: C,
) {
    let mut handled: Option<Instant> = None;

    loop {
        let next = *deadline.borrow_and_update();
        let at = match next {
            Some(at) if next != handled => at,
            _ => {
                if deadline.changed().await.is_err() {
                    return;
                }
                continue;
            }
        };

        let remaining = at.saturating_duration_since(clock.now());
        tokio::select! {
            _ = tokio::time::sleep(remaining) => {
                let Some(shared) = shared.upgrade() else {
                    return;
                };
                let outcome = shared.check_deadline().await;
                handled = match outcome {
                    DeadlineCheck::Rescheduled(_) => None,
                    _ => Some(at),
                };
                tracing::debug!(?outcome, "deadline checked");
            }
            changed = deadline.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
