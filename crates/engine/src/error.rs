// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the gate state machine

use gate_adapters::{ActuatorError, GateCommand};
use thiserror::Error;

/// Errors from gate operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The actuator rejected or did not complete a command
    #[error("actuator {command} failed: {source}")]
    Actuator {
        command: GateCommand,
        #[source]
        source: ActuatorError,
    },
    /// The open window cannot be represented as an instant
    #[error("open window of {0:?} is out of range")]
    WindowOverflow(std::time::Duration),
    /// A second command was issued while one was in flight. Unreachable
    /// while every command goes through the gate lock.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
