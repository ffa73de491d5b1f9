// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Access orchestration engine: detection filtering, authorization dispatch
//! and gate control

mod cooldown;
mod error;
mod gate;
mod orchestrator;

pub use cooldown::CooldownTracker;
pub use error::GateError;
pub use gate::{DeadlineCheck, GateSnapshot, GateState, GateStateMachine};
pub use orchestrator::{Intake, Orchestrator, OrchestratorDeps, ShutdownReport};
