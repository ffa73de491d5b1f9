// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process plate table authorizer

use super::{AuthError, AuthorizationClient};
use async_trait::async_trait;
use gate_core::{AuthorizationResult, Plate, PlateEntry, PlateStatus};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
struct Registration {
    status: PlateStatus,
    vehicle: Option<serde_json::Value>,
}

/// Authorizer backed by a fixed plate table from configuration.
///
/// Unknown plates are `NOT_FOUND`; inactive registrations are
/// `NOT_AUTHORIZED` but still carry their vehicle record.
#[derive(Clone, Debug, Default)]
pub struct StaticAuthorizationClient {
    plates: Arc<HashMap<Plate, Registration>>,
}

impl StaticAuthorizationClient {
    pub fn new(entries: &[PlateEntry]) -> Self {
        let plates = entries
            .iter()
            .map(|entry| {
                (
                    entry.plate.clone(),
                    Registration {
                        status: entry.status,
                        vehicle: entry.vehicle.clone(),
                    },
                )
            })
            .collect();
        Self {
            plates: Arc::new(plates),
        }
    }

    pub fn len(&self) -> usize {
        self.plates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }
}

#[async_trait]
impl AuthorizationClient for StaticAuthorizationClient {
    async fn validate(&self, plate: &Plate) -> Result<AuthorizationResult, AuthError> {
        let Some(registration) = self.plates.get(plate) else {
            return Ok(AuthorizationResult::not_found());
        };
        let vehicle = registration.vehicle.clone();
        Ok(match registration.status {
            PlateStatus::Authorized => AuthorizationResult::authorized(vehicle),
            PlateStatus::NotAuthorized | PlateStatus::Inactive => {
                AuthorizationResult::not_authorized(vehicle)
            }
        })
    }
}
