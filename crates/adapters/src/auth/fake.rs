// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake authorization client for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AuthError, AuthorizationClient};
use async_trait::async_trait;
use gate_core::{AuthorizationResult, Plate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Outcome {
    Respond(AuthorizationResult),
    Fail(AuthError),
    Hang,
}

#[derive(Debug, Clone)]
struct Script {
    outcome: Outcome,
    delay: Duration,
}

#[derive(Default)]
struct FakeAuthState {
    scripts: HashMap<Plate, Script>,
    calls: Vec<Plate>,
}

/// Fake authorization client with scripted per-plate outcomes.
///
/// Plates without a script resolve to `NOT_FOUND`.
#[derive(Clone, Default)]
pub struct FakeAuthorizationClient {
    state: Arc<Mutex<FakeAuthState>>,
}

impl FakeAuthorizationClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, plate: &Plate, outcome: Outcome) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .scripts
            .insert(
                plate.clone(),
                Script {
                    outcome,
                    delay: Duration::ZERO,
                },
            );
    }

    /// Respond to `plate` with `result`
    pub fn respond(&self, plate: &Plate, result: AuthorizationResult) {
        self.script(plate, Outcome::Respond(result));
    }

    /// Authorize `plate`
    pub fn allow(&self, plate: &Plate) {
        self.respond(plate, AuthorizationResult::authorized(None));
    }

    /// Explicitly refuse `plate`
    pub fn refuse(&self, plate: &Plate) {
        self.respond(plate, AuthorizationResult::not_authorized(None));
    }

    /// Fail lookups of `plate` with `error`
    pub fn fail(&self, plate: &Plate, error: AuthError) {
        self.script(plate, Outcome::Fail(error));
    }

    /// Never answer lookups of `plate`
    pub fn hang(&self, plate: &Plate) {
        self.script(plate, Outcome::Hang);
    }

    /// Delay the scripted outcome for `plate`
    pub fn delay(&self, plate: &Plate, delay: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let script = state.scripts.entry(plate.clone()).or_insert(Script {
            outcome: Outcome::Respond(AuthorizationResult::not_found()),
            delay: Duration::ZERO,
        });
        script.delay = delay;
    }

    /// Plates looked up so far, in call order
    pub fn calls(&self) -> Vec<Plate> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }
}

#[async_trait]
impl AuthorizationClient for FakeAuthorizationClient {
    async fn validate(&self, plate: &Plate) -> Result<AuthorizationResult, AuthError> {
        let script = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.calls.push(plate.clone());
            state.scripts.get(plate).cloned()
        };

        let Some(script) = script else {
            return Ok(AuthorizationResult::not_found());
        };

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }

        match script.outcome {
            Outcome::Respond(result) => Ok(result),
            Outcome::Fail(error) => Err(error),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
