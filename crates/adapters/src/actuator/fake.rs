// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake actuator for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ActuatorClient, ActuatorError, GateCommand};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded actuator command
pub type ActuatorCall = GateCommand;

#[derive(Default)]
struct FakeActuatorState {
    calls: Vec<ActuatorCall>,
    open_failure: Option<ActuatorError>,
    close_failure: Option<ActuatorError>,
    latency: Duration,
    hang: bool,
}

/// Fake actuator that records commands and detects overlapping calls.
///
/// Every attempted command is recorded, including ones that fail.
#[derive(Clone, Default)]
pub struct FakeActuator {
    state: Arc<Mutex<FakeActuatorState>>,
    in_flight: Arc<AtomicUsize>,
    overlaps: Arc<AtomicUsize>,
}

/// Decrements the in-flight count even if the command future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeActuator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeActuatorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All attempted commands, in order
    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.lock().calls.clone()
    }

    pub fn open_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| **c == GateCommand::Open)
            .count()
    }

    pub fn close_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| **c == GateCommand::Close)
            .count()
    }

    /// Number of commands that started while another was still running
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    /// Fail every `open()` with `error` until cleared
    pub fn fail_opens(&self, error: ActuatorError) {
        self.lock().open_failure = Some(error);
    }

    /// Fail every `close()` with `error` until cleared
    pub fn fail_closes(&self, error: ActuatorError) {
        self.lock().close_failure = Some(error);
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.open_failure = None;
        state.close_failure = None;
    }

    /// Make every command take `latency` to complete
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Make every command block forever
    pub fn hang(&self, hang: bool) {
        self.lock().hang = hang;
    }

    async fn command(&self, command: GateCommand) -> Result<(), ActuatorError> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let _in_flight = InFlight(&self.in_flight);

        let (latency, hang, failure) = {
            let mut state = self.lock();
            state.calls.push(command);
            let failure = match command {
                GateCommand::Open => state.open_failure.clone(),
                GateCommand::Close => state.close_failure.clone(),
            };
            (state.latency, state.hang, failure)
        };

        if hang {
            std::future::pending::<()>().await;
        }
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ActuatorClient for FakeActuator {
    async fn open(&self) -> Result<(), ActuatorError> {
        self.command(GateCommand::Open).await
    }

    async fn close(&self) -> Result<(), ActuatorError> {
        self.command(GateCommand::Close).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
