// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op actuator for running without gate hardware.

use super::{ActuatorClient, ActuatorError};
use async_trait::async_trait;

/// Actuator that logs commands and reports success.
///
/// Selected explicitly with `kind = "none"`; never substituted for a
/// serial actuator that failed to connect.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpActuator;

impl NoOpActuator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActuatorClient for NoOpActuator {
    async fn open(&self) -> Result<(), ActuatorError> {
        tracing::info!("simulated gate open");
        Ok(())
    }

    async fn close(&self) -> Result<(), ActuatorError> {
        tracing::info!("simulated gate close");
        Ok(())
    }
}
