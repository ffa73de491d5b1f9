// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gate-core: Core types for the access-gate orchestrator
//!
//! This crate provides:
//! - Plate identifiers and detection events
//! - Authorization results and decision records
//! - Clock and ID abstractions for testable time handling
//! - TOML configuration schema

pub mod clock;
pub mod id;

pub mod authorization;
pub mod config;
pub mod decision;
pub mod detection;
pub mod plate;

// Re-exports
pub use authorization::{AuthorizationResult, AuthorizationStatus};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    ActuatorConfig, AuthorizationConfig, Config, ConfigError, DaemonConfig, OrchestratorConfig,
    PlateEntry, PlateStatus, MAX_DURATION,
};
pub use decision::{Decision, DecisionRecord, GateAction};
pub use detection::{DetectionError, DetectionEvent, RawDetection};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use plate::{Plate, PlateError};
