// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization lookup adapters

mod http;
mod table;

pub use http::HttpAuthorizationClient;
pub use table::StaticAuthorizationClient;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAuthorizationClient;

use async_trait::async_trait;
use gate_core::{AuthorizationResult, Plate};
use std::time::Duration;
use thiserror::Error;

/// Errors from authorization lookups.
///
/// Callers map every variant to a `LOOKUP_ERROR` denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("service returned status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    BadResponse(String),
}

/// Adapter for the external authorization service
#[async_trait]
pub trait AuthorizationClient: Clone + Send + Sync + 'static {
    /// Look up whether a plate may pass. May block on I/O.
    async fn validate(&self, plate: &Plate) -> Result<AuthorizationResult, AuthError>;

    /// Check that the service is reachable
    async fn health(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
