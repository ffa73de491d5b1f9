// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate actuator adapters

mod noop;
mod serial;

pub use noop::NoOpActuator;
pub use serial::SerialActuator;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ActuatorCall, FakeActuator};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from actuator commands.
///
/// The actuator is assumed to keep its last physical position on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    #[error("actuator not connected: {0}")]
    NotConnected(String),
    #[error("write failed: {0}")]
    Write(String),
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
    #[error("hardware fault: {0}")]
    Fault(String),
}

/// Adapter for the physical gate.
///
/// Implementations may assume they are never called concurrently.
#[async_trait]
pub trait ActuatorClient: Clone + Send + Sync + 'static {
    /// Raise the gate
    async fn open(&self) -> Result<(), ActuatorError>;

    /// Lower the gate
    async fn close(&self) -> Result<(), ActuatorError>;
}

/// A single hardware command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCommand {
    Open,
    Close,
}

impl GateCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateCommand::Open => "open",
            GateCommand::Close => "close",
        }
    }

    /// Issue this command on `actuator`
    pub async fn send<A: ActuatorClient>(&self, actuator: &A) -> Result<(), ActuatorError> {
        match self {
            GateCommand::Open => actuator.open().await,
            GateCommand::Close => actuator.close().await,
        }
    }
}

impl std::fmt::Display for GateCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
