// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision records exposed to monitoring collaborators

use crate::authorization::AuthorizationStatus;
use crate::plate::Plate;
use serde::{Deserialize, Serialize};

/// What the orchestrator decided for one detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    SkippedLowConfidence,
    SkippedCooldown,
    Authorized,
    Denied,
    LookupError,
}

impl Decision {
    /// Map an authorization status onto the decision it produces
    pub fn from_status(status: AuthorizationStatus) -> Self {
        match status {
            AuthorizationStatus::Authorized => Decision::Authorized,
            AuthorizationStatus::NotAuthorized | AuthorizationStatus::NotFound => Decision::Denied,
            AuthorizationStatus::LookupError => Decision::LookupError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::SkippedLowConfidence => "SKIPPED_LOW_CONFIDENCE",
            Decision::SkippedCooldown => "SKIPPED_COOLDOWN",
            Decision::Authorized => "AUTHORIZED",
            Decision::Denied => "DENIED",
            Decision::LookupError => "LOOKUP_ERROR",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effect a decision had on the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateAction {
    None,
    Open,
    Close,
    Extend,
}

impl GateAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateAction::None => "NONE",
            GateAction::Open => "OPEN",
            GateAction::Close => "CLOSE",
            GateAction::Extend => "EXTEND",
        }
    }
}

impl std::fmt::Display for GateAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured record emitted for every decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Correlation ID; absent for events filtered before dispatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub plate: Plate,
    pub confidence: f64,
    pub decision: Decision,
    pub gate_action: GateAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AuthorizationStatus>,
}

impl DecisionRecord {
    /// Record for a detection filtered before authorization
    pub fn skipped(plate: Plate, confidence: f64, decision: Decision) -> Self {
        Self {
            id: None,
            plate,
            confidence,
            decision,
            gate_action: GateAction::None,
            status: None,
        }
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
