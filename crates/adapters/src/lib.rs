// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the authorization service and the gate actuator

pub mod actuator;
pub mod auth;
pub mod traced;

pub use actuator::{ActuatorClient, ActuatorError, GateCommand, NoOpActuator, SerialActuator};
pub use auth::{AuthError, AuthorizationClient, HttpAuthorizationClient, StaticAuthorizationClient};
pub use traced::{TracedActuator, TracedAuthorizationClient};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use actuator::{ActuatorCall, FakeActuator};
#[cfg(any(test, feature = "test-support"))]
pub use auth::FakeAuthorizationClient;
