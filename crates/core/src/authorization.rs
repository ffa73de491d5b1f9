// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization lookup results

use serde::{Deserialize, Serialize};

/// Outcome of an authorization lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
    Authorized,
    NotAuthorized,
    NotFound,
    LookupError,
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationStatus::Authorized => "AUTHORIZED",
            AuthorizationStatus::NotAuthorized => "NOT_AUTHORIZED",
            AuthorizationStatus::NotFound => "NOT_FOUND",
            AuthorizationStatus::LookupError => "LOOKUP_ERROR",
        }
    }
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one authorization call. Read-only once produced.
///
/// `authorized` is only ever true together with
/// [`AuthorizationStatus::Authorized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationResult {
    pub authorized: bool,
    pub status: AuthorizationStatus,
    /// Opaque vehicle record passed through from the authorization service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_info: Option<serde_json::Value>,
}

impl AuthorizationResult {
    /// Build a result, forcing `authorized = false` unless both the flag and
    /// the status agree
    pub fn new(
        authorized: bool,
        status: AuthorizationStatus,
        vehicle_info: Option<serde_json::Value>,
    ) -> Self {
        Self {
            authorized: authorized && status == AuthorizationStatus::Authorized,
            status,
            vehicle_info,
        }
    }

    pub fn authorized(vehicle_info: Option<serde_json::Value>) -> Self {
        Self::new(true, AuthorizationStatus::Authorized, vehicle_info)
    }

    pub fn not_authorized(vehicle_info: Option<serde_json::Value>) -> Self {
        Self::new(false, AuthorizationStatus::NotAuthorized, vehicle_info)
    }

    pub fn not_found() -> Self {
        Self::new(false, AuthorizationStatus::NotFound, None)
    }

    pub fn lookup_error() -> Self {
        Self::new(false, AuthorizationStatus::LookupError, None)
    }
}
