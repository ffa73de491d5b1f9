// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use gate_adapters::{
    ActuatorClient, ActuatorError, AuthError, AuthorizationClient, HttpAuthorizationClient,
    NoOpActuator, SerialActuator, StaticAuthorizationClient, TracedActuator,
    TracedAuthorizationClient,
};
use gate_core::{
    ActuatorConfig, AuthorizationConfig, AuthorizationResult, Config, DecisionRecord,
    Plate, SystemClock, UuidIdGen,
};
use gate_engine::{Orchestrator, OrchestratorDeps, ShutdownReport};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Orchestrator with concrete adapter types (wrapped with tracing)
pub type DaemonOrchestrator = Orchestrator<
    TracedAuthorizationClient<ConfiguredAuthorizer>,
    TracedActuator<ConfiguredActuator>,
    SystemClock,
    UuidIdGen,
>;

/// Authorization binding selected by `[authorization] kind`
#[derive(Clone)]
pub enum ConfiguredAuthorizer {
    Http(HttpAuthorizationClient),
    Table(StaticAuthorizationClient),
}

impl ConfiguredAuthorizer {
    pub fn from_config(config: &Config) -> Self {
        match &config.authorization {
            AuthorizationConfig::Http { url, health_url } => {
                let client =
                    HttpAuthorizationClient::new(url.clone(), config.orchestrator.lookup_timeout);
                match health_url {
                    Some(health) => Self::Http(client.with_health_url(health.clone())),
                    None => Self::Http(client),
                }
            }
            AuthorizationConfig::Table { plates } => {
                Self::Table(StaticAuthorizationClient::new(plates))
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Table(_) => "table",
        }
    }
}

#[async_trait]
impl AuthorizationClient for ConfiguredAuthorizer {
    async fn validate(&self, plate: &Plate) -> Result<AuthorizationResult, AuthError> {
        match self {
            Self::Http(client) => client.validate(plate).await,
            Self::Table(client) => client.validate(plate).await,
        }
    }

    async fn health(&self) -> Result<(), AuthError> {
        match self {
            Self::Http(client) => client.health().await,
            Self::Table(client) => client.health().await,
        }
    }
}

/// Actuator binding selected by `[actuator] kind`
#[derive(Clone)]
pub enum ConfiguredActuator {
    Serial(SerialActuator),
    Simulated(NoOpActuator),
}

impl ConfiguredActuator {
    pub fn from_config(config: &ActuatorConfig) -> Self {
        match config {
            ActuatorConfig::Serial {
                device,
                open_command,
                close_command,
                settle,
            } => Self::Serial(
                SerialActuator::new(device.clone(), open_command.clone(), close_command.clone())
                    .with_settle(*settle),
            ),
            ActuatorConfig::Simulated => Self::Simulated(NoOpActuator::new()),
        }
    }
}

#[async_trait]
impl ActuatorClient for ConfiguredActuator {
    async fn open(&self) -> Result<(), ActuatorError> {
        match self {
            Self::Serial(actuator) => actuator.open().await,
            Self::Simulated(actuator) => actuator.open().await,
        }
    }

    async fn close(&self) -> Result<(), ActuatorError> {
        match self {
            Self::Serial(actuator) => actuator.close().await,
            Self::Simulated(actuator) => actuator.close().await,
        }
    }
}

/// Daemon state during operation
pub struct Daemon {
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    lock: Option<(File, PathBuf)>,
    pub orchestrator: DaemonOrchestrator,
    decisions: Option<mpsc::Receiver<DecisionRecord>>,
}

impl Daemon {
    /// Hand the decision stream to its consumer. Returns `None` after the
    /// first call.
    pub fn take_decisions(&mut self) -> Option<mpsc::Receiver<DecisionRecord>> {
        self.decisions.take()
    }

    /// Shut the orchestrator down and release the instance lock.
    ///
    /// Consumes the daemon so the decision stream closes once it returns.
    pub async fn shutdown(self) -> ShutdownReport {
        info!("Shutting down daemon...");
        let report = self.orchestrator.shutdown().await;

        if let Some((file, path)) = self.lock {
            drop(file);
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to remove lock file {}: {}", path.display(), e);
            }
        }

        info!("Daemon shutdown complete");
        report
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock at {0}: daemon already running?")]
    LockFailed(PathBuf, #[source] std::io::Error),

    #[error("Invalid log path: {0}")]
    InvalidLogPath(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Take the single-instance lock and record our PID in it
pub fn acquire_lock(path: &Path) -> Result<File, LifecycleError> {
    use std::io::Write;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    file.try_lock_exclusive()
        .map_err(|e| LifecycleError::LockFailed(path.to_path_buf(), e))?;

    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

/// Start the daemon
///
/// Must be called from within a tokio runtime.
pub async fn startup(config: &Config) -> Result<Daemon, LifecycleError> {
    // 1. Acquire lock file FIRST - prevents two controllers driving one gate
    let lock = match &config.daemon.lock_path {
        Some(path) => Some((acquire_lock(path)?, path.clone())),
        None => None,
    };

    // 2. Set up adapters (wrapped with tracing for observability)
    let authorizer = ConfiguredAuthorizer::from_config(config);
    info!(kind = authorizer.kind(), "authorization client configured");
    let authorizer = TracedAuthorizationClient::new(authorizer);

    let actuator = ConfiguredActuator::from_config(&config.actuator);
    match &actuator {
        ConfiguredActuator::Serial(serial) => {
            // Not fatal: the device may appear later, commands report errors until then
            if let Err(e) = serial.connect().await {
                warn!(
                    device = %serial.device().display(),
                    error = %e,
                    "actuator not reachable at startup"
                );
            } else {
                info!(device = %serial.device().display(), "actuator connected");
            }
        }
        ConfiguredActuator::Simulated(_) => {
            warn!("no actuator attached, gate commands are simulated");
        }
    }
    let actuator = TracedActuator::new(actuator);

    // 3. Probe the authorization service without delaying startup
    let probe = authorizer.clone();
    tokio::spawn(async move {
        if let Err(e) = probe.health().await {
            warn!(
                error = %e,
                "authorization service health check failed, lookups will deny until it recovers"
            );
        }
    });

    // 4. Create orchestrator
    let (decision_tx, decisions) = mpsc::channel(config.orchestrator.decision_buffer);
    let orchestrator = Orchestrator::new(
        &config.orchestrator,
        OrchestratorDeps {
            authorizer,
            actuator,
            clock: SystemClock,
            id_gen: UuidIdGen,
        },
        decision_tx,
    );

    info!(
        threshold = config.orchestrator.confidence_threshold,
        cooldown_ms = config.orchestrator.cooldown.as_millis() as u64,
        open_ms = config.orchestrator.open_duration.as_millis() as u64,
        "Daemon started"
    );

    Ok(Daemon {
        lock,
        orchestrator,
        decisions: Some(decisions),
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
