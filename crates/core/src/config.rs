// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file schema
//!
//! Everything except `[actuator]` has a default. The actuator must be chosen
//! explicitly so that running without hardware is a deliberate decision.

use crate::plate::Plate;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Longest duration any timing setting may take
pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub authorization: AuthorizationConfig,
    pub actuator: ActuatorConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Filtering and timing policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Detections below this confidence are dropped before any other check
    pub confidence_threshold: f64,
    /// Minimum interval between accepted detections of the same plate
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
    /// How long one authorization keeps the gate open
    #[serde(with = "humantime_serde")]
    pub open_duration: Duration,
    /// Upper bound on a single authorization lookup
    #[serde(with = "humantime_serde")]
    pub lookup_timeout: Duration,
    /// Upper bound on a single actuator command
    #[serde(with = "humantime_serde")]
    pub actuator_timeout: Duration,
    /// How long shutdown waits for in-flight lookups
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
    /// Capacity of the decision record channel
    pub decision_buffer: usize,
    /// Capacity of the detection intake channel
    pub intake_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            cooldown: Duration::from_secs(5),
            open_duration: Duration::from_secs(3),
            lookup_timeout: Duration::from_secs(10),
            actuator_timeout: Duration::from_secs(5),
            shutdown_grace: Duration::from_millis(500),
            decision_buffer: 256,
            intake_buffer: 64,
        }
    }
}

/// Authorization service binding
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthorizationConfig {
    /// Remote validation service reached over HTTP
    Http {
        url: String,
        #[serde(default)]
        health_url: Option<String>,
    },
    /// In-process plate table
    Table {
        #[serde(default)]
        plates: Vec<PlateEntry>,
    },
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        AuthorizationConfig::Http {
            url: "http://localhost:8000/validate".to_string(),
            health_url: Some("http://localhost:8000/health".to_string()),
        }
    }
}

/// Registration state of a plate in the table authorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateStatus {
    Authorized,
    NotAuthorized,
    /// Deactivated registration; treated as not authorized
    Inactive,
}

/// One row of the table authorizer
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlateEntry {
    pub plate: Plate,
    pub status: PlateStatus,
    #[serde(default)]
    pub vehicle: Option<serde_json::Value>,
}

/// Gate actuator binding
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActuatorConfig {
    /// Line-oriented commands written to a character device
    Serial {
        device: PathBuf,
        #[serde(default = "default_open_command")]
        open_command: String,
        #[serde(default = "default_close_command")]
        close_command: String,
        /// Pause after opening the device before the first command, for
        /// boards that reset on connect
        #[serde(default = "default_settle", with = "humantime_serde")]
        settle: Duration,
    },
    /// No hardware attached; commands are logged and succeed
    #[serde(rename = "none")]
    Simulated,
}

fn default_open_command() -> String {
    "OPEN".to_string()
}

fn default_close_command() -> String {
    "CLOSE".to_string()
}

fn default_settle() -> Duration {
    Duration::from_secs(2)
}

/// Process-level settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// Log file; stderr when unset
    pub log_path: Option<PathBuf>,
    /// Exclusive lock guarding the actuator against a second daemon
    pub lock_path: Option<PathBuf>,
    /// How often expired cooldown entries are pruned
    #[serde(with = "humantime_serde")]
    pub cooldown_prune_interval: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            lock_path: None,
            cooldown_prune_interval: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let o = &self.orchestrator;

        if !(0.0..=1.0).contains(&o.confidence_threshold) {
            return Err(invalid(format!(
                "orchestrator.confidence_threshold must be within [0, 1], got {}",
                o.confidence_threshold
            )));
        }

        for (name, value) in [
            ("cooldown", o.cooldown),
            ("open_duration", o.open_duration),
            ("lookup_timeout", o.lookup_timeout),
            ("actuator_timeout", o.actuator_timeout),
        ] {
            if value.is_zero() {
                return Err(invalid(format!("orchestrator.{} must be non-zero", name)));
            }
        }

        for (name, value) in [
            ("orchestrator.cooldown", o.cooldown),
            ("orchestrator.open_duration", o.open_duration),
            ("orchestrator.lookup_timeout", o.lookup_timeout),
            ("orchestrator.actuator_timeout", o.actuator_timeout),
            ("orchestrator.shutdown_grace", o.shutdown_grace),
            ("daemon.cooldown_prune_interval", self.daemon.cooldown_prune_interval),
        ] {
            if value > MAX_DURATION {
                return Err(invalid(format!(
                    "{} must be at most {}h, got {:?}",
                    name,
                    MAX_DURATION.as_secs() / 3600,
                    value
                )));
            }
        }

        if o.decision_buffer == 0 || o.intake_buffer == 0 {
            return Err(invalid("orchestrator buffers must be non-zero"));
        }

        if self.daemon.cooldown_prune_interval.is_zero() {
            return Err(invalid("daemon.cooldown_prune_interval must be non-zero"));
        }

        match &self.authorization {
            AuthorizationConfig::Http { url, .. } if url.trim().is_empty() => {
                return Err(invalid("authorization.url must not be empty"));
            }
            AuthorizationConfig::Table { plates } => {
                let mut seen = HashSet::new();
                for entry in plates {
                    if !seen.insert(&entry.plate) {
                        return Err(invalid(format!(
                            "authorization.plates lists {} more than once",
                            entry.plate
                        )));
                    }
                }
            }
            AuthorizationConfig::Http { .. } => {}
        }

        if let ActuatorConfig::Serial {
            open_command,
            close_command,
            settle,
            ..
        } = &self.actuator
        {
            for (name, command) in [("open_command", open_command), ("close_command", close_command)]
            {
                if command.is_empty() || command.contains(['\n', '\r']) {
                    return Err(invalid(format!(
                        "actuator.{} must be a single non-empty line",
                        name
                    )));
                }
            }
            if open_command == close_command {
                return Err(invalid("actuator open and close commands must differ"));
            }
            // The first command on a fresh connection includes the settle pause
            if *settle >= o.actuator_timeout {
                return Err(invalid(format!(
                    "actuator.settle ({:?}) must be shorter than orchestrator.actuator_timeout ({:?})",
                    settle, o.actuator_timeout
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
