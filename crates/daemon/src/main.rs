// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access gate daemon (gated)
//!
//! Reads plate detections from stdin, drives the gate, and writes one
//! decision record per detection to stdout.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod ingress;
mod lifecycle;
mod output;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gate_core::{Config, DaemonConfig};
use tokio::io::BufReader;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::lifecycle::LifecycleError;

#[derive(Parser)]
#[command(name = "gated", version, about = "Access gate orchestrator daemon")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short)]
    config: PathBuf,
}

/// How long runtime teardown waits for the stdin reader thread, which
/// cannot be interrupted mid-read
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(args));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    result
}

async fn run(args: Args) -> Result<()> {
    // Load configuration before logging so a bad file fails loudly on stderr
    let config = Config::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    // Set up logging
    let _log_guard = setup_logging(&config.daemon)?;

    info!("Starting gated with config {}", args.config.display());

    let mut daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let (intake_tx, mut intake) = mpsc::channel(config.orchestrator.intake_buffer);
    let reader = ingress::spawn_reader(BufReader::new(tokio::io::stdin()), intake_tx);
    let writer = daemon
        .take_decisions()
        .map(|decisions| output::spawn_writer(decisions, tokio::io::stdout()));

    let mut prune = tokio::time::interval(config.daemon.cooldown_prune_interval);
    prune.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    prune.tick().await;

    info!("Daemon ready");

    // Main event loop
    loop {
        tokio::select! {
            event = intake.recv() => {
                match event {
                    Some(event) => {
                        daemon.orchestrator.on_detection(event);
                    }
                    None => {
                        info!("Detection input closed, shutting down...");
                        break;
                    }
                }
            }

            _ = prune.tick() => {
                let removed = daemon.orchestrator.prune_cooldown();
                debug!(removed, "pruned cooldown entries");
            }

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    reader.abort();
    let report = daemon.shutdown().await;
    if !report.closed {
        warn!("Gate may not be closed, check the actuator");
    }

    // The decision channel closes with the daemon; wait for the last lines
    if let Some(writer) = writer {
        match writer.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("Failed to write decisions: {}", e),
            Err(e) => error!("Decision writer stopped: {}", e),
        }
    }

    info!(abandoned = report.abandoned, "Daemon stopped");
    Ok(())
}

fn setup_logging(
    config: &DaemonConfig,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // stdout carries decision records, so logs go to a file or stderr
    let (non_blocking, guard, ansi) = match &config.log_path {
        Some(log_path) => {
            let dir = log_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)?;
            let file_name = log_path
                .file_name()
                .ok_or_else(|| LifecycleError::InvalidLogPath(log_path.clone()))?;
            let file_appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            (writer, guard, false)
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, guard, true)
        }
    };

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(ansi))
        .init();

    Ok(guard)
}
