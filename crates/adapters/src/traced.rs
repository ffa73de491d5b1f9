// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::actuator::{ActuatorClient, ActuatorError, GateCommand};
use crate::auth::{AuthError, AuthorizationClient};
use async_trait::async_trait;
use gate_core::{AuthorizationResult, Plate};
use tracing::Instrument;

/// Wrapper that adds tracing to any AuthorizationClient
#[derive(Clone)]
pub struct TracedAuthorizationClient<A> {
    inner: A,
}

impl<A> TracedAuthorizationClient<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: AuthorizationClient> AuthorizationClient for TracedAuthorizationClient<A> {
    async fn validate(&self, plate: &Plate) -> Result<AuthorizationResult, AuthError> {
        let span = tracing::info_span!("auth.validate", plate = %plate);

        async {
            tracing::debug!("looking up");

            let start = std::time::Instant::now();
            let result = self.inner.validate(plate).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(r) => tracing::info!(
                    status = %r.status,
                    authorized = r.authorized,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "lookup complete"
                ),
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "lookup failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn health(&self) -> Result<(), AuthError> {
        let result = self.inner.health().await;
        match &result {
            Ok(()) => tracing::info!("authorization service healthy"),
            Err(e) => tracing::warn!(error = %e, "authorization service unhealthy"),
        }
        result
    }
}

/// Wrapper that adds tracing to any ActuatorClient
#[derive(Clone)]
pub struct TracedActuator<G> {
    inner: G,
}

impl<G> TracedActuator<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G: ActuatorClient> TracedActuator<G> {
    async fn traced(&self, command: GateCommand) -> Result<(), ActuatorError> {
        let span = tracing::info_span!("actuator.command", command = %command);

        async {
            let start = std::time::Instant::now();
            let result = command.send(&self.inner).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "command sent"),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "command failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl<G: ActuatorClient> ActuatorClient for TracedActuator<G> {
    async fn open(&self) -> Result<(), ActuatorError> {
        self.traced(GateCommand::Open).await
    }

    async fn close(&self) -> Result<(), ActuatorError> {
        self.traced(GateCommand::Close).await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
