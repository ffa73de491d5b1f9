// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP binding for the authorization service

use super::{AuthError, AuthorizationClient};
use async_trait::async_trait;
use gate_core::{AuthorizationResult, AuthorizationStatus, Plate};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ureq::Agent;

#[derive(Serialize)]
struct ValidateRequest<'a> {
    plate: &'a str,
}

#[derive(Deserialize)]
struct ValidateResponse {
    authorized: bool,
    status: AuthorizationStatus,
    #[serde(default)]
    vehicle: Option<serde_json::Value>,
}

/// Authorization client that POSTs `{"plate": ...}` as JSON and expects
/// `{"authorized", "status", "vehicle"?}` back.
///
/// ureq is blocking, so each call runs on the blocking pool.
#[derive(Clone)]
pub struct HttpAuthorizationClient {
    agent: Agent,
    url: String,
    health_url: Option<String>,
    timeout: Duration,
}

impl HttpAuthorizationClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            url: url.into(),
            health_url: None,
            timeout,
        }
    }

    pub fn with_health_url(mut self, url: impl Into<String>) -> Self {
        self.health_url = Some(url.into());
        self
    }

    fn map_error(&self, error: ureq::Error) -> AuthError {
        match error {
            ureq::Error::StatusCode(code) => AuthError::Status(code),
            ureq::Error::Timeout(_) => AuthError::Timeout(self.timeout),
            other => AuthError::Connection(other.to_string()),
        }
    }

    fn validate_blocking(&self, plate: &str) -> Result<AuthorizationResult, AuthError> {
        let body = serde_json::to_string(&ValidateRequest { plate })
            .map_err(|e| AuthError::BadResponse(format!("failed to encode request: {}", e)))?;

        let mut response = self
            .agent
            .post(&self.url)
            .header("Content-Type", "application/json")
            .send(body.as_bytes())
            .map_err(|e| self.map_error(e))?;

        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| self.map_error(e))?;

        let parsed: ValidateResponse =
            serde_json::from_str(&text).map_err(|e| AuthError::BadResponse(e.to_string()))?;

        Ok(AuthorizationResult::new(
            parsed.authorized,
            parsed.status,
            parsed.vehicle,
        ))
    }

    fn health_blocking(&self, url: &str) -> Result<(), AuthError> {
        self.agent
            .get(url)
            .call()
            .map(|_| ())
            .map_err(|e| self.map_error(e))
    }
}

#[async_trait]
impl AuthorizationClient for HttpAuthorizationClient {
    async fn validate(&self, plate: &Plate) -> Result<AuthorizationResult, AuthError> {
        let client = self.clone();
        let plate = plate.as_str().to_string();
        tokio::task::spawn_blocking(move || client.validate_blocking(&plate))
            .await
            .map_err(|e| AuthError::Connection(format!("lookup task failed: {}", e)))?
    }

    async fn health(&self) -> Result<(), AuthError> {
        let Some(url) = self.health_url.clone() else {
            return Ok(());
        };
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.health_blocking(&url))
            .await
            .map_err(|e| AuthError::Connection(format!("health task failed: {}", e)))?
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
