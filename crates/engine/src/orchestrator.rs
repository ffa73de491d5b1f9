// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detection intake and authorization dispatch
//!
//! Intake is synchronous: filtering happens inline and accepted detections
//! are handed to a task set. Each task looks the plate up, drives the gate,
//! and emits one decision record.

use crate::cooldown::CooldownTracker;
use crate::gate::GateStateMachine;
use gate_adapters::{ActuatorClient, AuthorizationClient};
use gate_core::{
    AuthorizationResult, Clock, Decision, DecisionRecord, DetectionEvent, GateAction, IdGen,
    OrchestratorConfig,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{JoinError, JoinSet};
use tracing::Instrument;

/// External collaborators, injected at construction
pub struct OrchestratorDeps<A, G, C, I> {
    pub authorizer: A,
    pub actuator: G,
    pub clock: C,
    pub id_gen: I,
}

/// What happened to a detection at intake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    /// Filtered before authorization; the record was already emitted
    Skipped(Decision),
    /// Handed to an authorization task
    Dispatched { id: String },
    /// Shutdown has begun
    Rejected,
}

/// Outcome of [`Orchestrator::shutdown`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tasks still running when the grace period ran out
    pub abandoned: usize,
    /// Whether the final close command succeeded
    pub closed: bool,
}

/// State shared with authorization tasks
struct Dispatch<A, G: ActuatorClient, C: Clock> {
    authorizer: A,
    gate: GateStateMachine<G, C>,
    decisions: mpsc::Sender<DecisionRecord>,
    open_duration: Duration,
    lookup_timeout: Duration,
}

impl<A, G, C> Dispatch<A, G, C>
where
    A: AuthorizationClient,
    G: ActuatorClient,
    C: Clock,
{
    fn emit(&self, record: DecisionRecord) {
        match self.decisions.try_send(record) {
            Ok(()) => {}
            Err(TrySendError::Full(record)) => {
                tracing::warn!(
                    plate = %record.plate,
                    decision = %record.decision,
                    "decision channel full, record dropped"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("decision channel closed, record dropped");
            }
        }
    }

    async fn lookup(&self, event: &DetectionEvent) -> AuthorizationResult {
        match tokio::time::timeout(self.lookup_timeout, self.authorizer.validate(&event.plate))
            .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "authorization lookup failed, denying");
                AuthorizationResult::lookup_error()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "authorization lookup timed out, denying"
                );
                AuthorizationResult::lookup_error()
            }
        }
    }

    async fn process(self: Arc<Self>, id: String, event: DetectionEvent) {
        let result = self.lookup(&event).await;

        let decision = match Decision::from_status(result.status) {
            Decision::Authorized if !result.authorized => Decision::Denied,
            decision => decision,
        };

        let outcome = if decision == Decision::Authorized {
            self.gate.authorize(self.open_duration).await
        } else {
            self.gate.deny().await
        };
        let gate_action = outcome.unwrap_or_else(|e| {
            tracing::error!(error = %e, "gate command failed");
            GateAction::None
        });

        tracing::info!(
            %decision,
            %gate_action,
            status = %result.status,
            "detection processed"
        );
        self.emit(DecisionRecord {
            id: Some(id),
            plate: event.plate,
            confidence: event.confidence,
            decision,
            gate_action,
            status: Some(result.status),
        });
    }
}

/// Turns detections into gate commands.
///
/// Holds the cooldown map and the gate; the authorizer, actuator, clock and
/// id generator are supplied by the caller.
pub struct Orchestrator<A, G, C, I>
where
    G: ActuatorClient,
    C: Clock,
{
    dispatch: Arc<Dispatch<A, G, C>>,
    clock: C,
    cooldown: CooldownTracker,
    id_gen: I,
    confidence_threshold: f64,
    cooldown_window: Duration,
    shutdown_grace: Duration,
    /// `None` once shutdown has begun
    tasks: Mutex<Option<JoinSet<()>>>,
}

impl<A, G, C, I> Orchestrator<A, G, C, I>
where
    A: AuthorizationClient,
    G: ActuatorClient,
    C: Clock,
    I: IdGen,
{
    /// Build an orchestrator with a closed gate.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: &OrchestratorConfig,
        deps: OrchestratorDeps<A, G, C, I>,
        decisions: mpsc::Sender<DecisionRecord>,
    ) -> Self {
        let gate = GateStateMachine::with_clock(
            deps.actuator,
            config.actuator_timeout,
            deps.clock.clone(),
        );
        Self {
            dispatch: Arc::new(Dispatch {
                authorizer: deps.authorizer,
                gate,
                decisions,
                open_duration: config.open_duration,
                lookup_timeout: config.lookup_timeout,
            }),
            clock: deps.clock,
            cooldown: CooldownTracker::new(),
            id_gen: deps.id_gen,
            confidence_threshold: config.confidence_threshold,
            cooldown_window: config.cooldown,
            shutdown_grace: config.shutdown_grace,
            tasks: Mutex::new(Some(JoinSet::new())),
        }
    }

    fn is_accepting(&self) -> bool {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Filter a detection and dispatch it for authorization. Never waits on
    /// the authorizer or the gate.
    pub fn on_detection(&self, event: DetectionEvent) -> Intake {
        if !self.is_accepting() {
            tracing::warn!(plate = %event.plate, "detection rejected, shutting down");
            return Intake::Rejected;
        }

        if event.confidence < self.confidence_threshold {
            tracing::debug!(
                plate = %event.plate,
                confidence = event.confidence,
                threshold = self.confidence_threshold,
                "below confidence threshold"
            );
            return self.skip(event, Decision::SkippedLowConfidence);
        }

        let now = self.clock.now();
        if !self
            .cooldown
            .should_process(&event.plate, now, self.cooldown_window)
        {
            tracing::debug!(plate = %event.plate, "plate in cooldown");
            return self.skip(event, Decision::SkippedCooldown);
        }

        let mut guard = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        let Some(tasks) = guard.as_mut() else {
            tracing::warn!(plate = %event.plate, "detection rejected, shutting down");
            return Intake::Rejected;
        };

        while let Some(joined) = tasks.try_join_next() {
            log_join_error(joined);
        }

        let id = self.id_gen.next();
        let span = tracing::info_span!("detection", id = %id, plate = %event.plate);
        tasks.spawn(
            Arc::clone(&self.dispatch)
                .process(id.clone(), event)
                .instrument(span),
        );
        Intake::Dispatched { id }
    }

    fn skip(&self, event: DetectionEvent, decision: Decision) -> Intake {
        self.dispatch.emit(DecisionRecord::skipped(
            event.plate,
            event.confidence,
            decision,
        ));
        Intake::Skipped(decision)
    }

    /// Stop intake, drain in-flight work for up to the grace period, then
    /// force the gate closed.
    ///
    /// A close failure is logged and reported; shutdown still completes.
    pub async fn shutdown(&self) -> ShutdownReport {
        let taken = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(mut tasks) = taken else {
            tracing::debug!("shutdown already ran");
            return ShutdownReport::default();
        };

        tracing::info!(in_flight = tasks.len(), "shutting down orchestrator");
        let drain = async {
            while let Some(joined) = tasks.join_next().await {
                log_join_error(joined);
            }
        };

        let mut abandoned = 0;
        if tokio::time::timeout(self.shutdown_grace, drain).await.is_err() {
            abandoned = tasks.len();
            tracing::warn!(abandoned, "abandoning in-flight detections");
            tasks.shutdown().await;
        }

        let gate = &self.dispatch.gate;
        let closed = match gate.force_close().await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to close gate during shutdown");
                false
            }
        };
        gate.stop();

        tracing::info!(abandoned, closed, "orchestrator stopped");
        ShutdownReport { abandoned, closed }
    }

    /// Forget plates whose cooldown has expired
    pub fn prune_cooldown(&self) -> usize {
        self.cooldown
            .prune(self.clock.now(), self.cooldown_window)
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    pub fn gate(&self) -> &GateStateMachine<G, C> {
        &self.dispatch.gate
    }

    /// Authorization tasks not yet reaped
    pub fn in_flight(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or(0, JoinSet::len)
    }
}

fn log_join_error(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            tracing::error!(error = %e, "detection task panicked");
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
