// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-plate cooldown tracking

use gate_core::Plate;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Decides whether a plate should be processed again.
///
/// Each plate keeps the instant it was last accepted. The check and the
/// update happen under one lock, so two near-simultaneous observations of the
/// same plate cannot both pass.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    last_processed: Mutex<HashMap<Plate, Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records `now` when `plate` is outside its cooldown
    /// window; returns false and leaves the entry untouched otherwise.
    pub fn should_process(&self, plate: &Plate, now: Instant, cooldown: Duration) -> bool {
        let mut entries = self
            .last_processed
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        if let Some(last) = entries.get(plate) {
            if now.saturating_duration_since(*last) < cooldown {
                return false;
            }
        }

        entries.insert(plate.clone(), now);
        true
    }

    /// Drop entries last accepted at least `horizon` ago. Pruning with a
    /// horizon of one cooldown never changes a future decision.
    pub fn prune(&self, now: Instant, horizon: Duration) -> usize {
        let mut entries = self
            .last_processed
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, last| now.saturating_duration_since(*last) < horizon);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.last_processed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "cooldown_tests.rs"]
mod tests;
