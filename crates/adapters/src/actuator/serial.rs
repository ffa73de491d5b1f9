// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented actuator over a character device (serial port, USB CDC)
//!
//! Each command is one newline-terminated word. Line settings such as baud
//! rate belong to the device configuration, not to this adapter. Boards that
//! reset when the port opens get a settle pause before the first write.

use super::{ActuatorClient, ActuatorError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Actuator that writes command words to a device file.
///
/// The device is opened on first use. A failed write drops the handle so the
/// next command reopens it.
#[derive(Clone)]
pub struct SerialActuator {
    device: PathBuf,
    open_command: String,
    close_command: String,
    settle: Duration,
    port: Arc<Mutex<Option<File>>>,
}

impl SerialActuator {
    pub fn new(
        device: impl Into<PathBuf>,
        open_command: impl Into<String>,
        close_command: impl Into<String>,
    ) -> Self {
        Self {
            device: device.into(),
            open_command: open_command.into(),
            close_command: close_command.into(),
            settle: Duration::ZERO,
            port: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait this long after each (re)connect before writing
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Open the device now rather than on the first command
    pub async fn connect(&self) -> Result<(), ActuatorError> {
        let mut port = self.port.lock().await;
        self.ensure_open(&mut port).await?;
        Ok(())
    }

    /// Drop the device handle
    pub async fn disconnect(&self) {
        self.port.lock().await.take();
    }

    pub async fn is_connected(&self) -> bool {
        self.port.lock().await.is_some()
    }

    async fn open_device(&self) -> Result<File, ActuatorError> {
        OpenOptions::new()
            .write(true)
            .append(true)
            .open(&self.device)
            .await
            .map_err(|e| ActuatorError::NotConnected(format!("{}: {}", self.device.display(), e)))
    }

    /// Open the device if needed. Returns the handle once the settle pause
    /// has passed.
    async fn ensure_open<'p>(
        &self,
        port: &'p mut Option<File>,
    ) -> Result<&'p mut File, ActuatorError> {
        if port.is_none() {
            let file = self.open_device().await?;
            if !self.settle.is_zero() {
                tracing::debug!(
                    device = %self.device.display(),
                    settle_ms = self.settle.as_millis() as u64,
                    "waiting for device to settle"
                );
                tokio::time::sleep(self.settle).await;
            }
            *port = Some(file);
        }
        port.as_mut()
            .ok_or_else(|| ActuatorError::NotConnected(self.device.display().to_string()))
    }

    async fn send(&self, command: &str) -> Result<(), ActuatorError> {
        let mut port = self.port.lock().await;
        let file = self.ensure_open(&mut port).await?;

        let line = format!("{}\n", command);
        let written = match file.write_all(line.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            *port = None;
            return Err(ActuatorError::Write(e.to_string()));
        }

        tracing::debug!(device = %self.device.display(), command, "command written");
        Ok(())
    }
}

#[async_trait]
impl ActuatorClient for SerialActuator {
    async fn open(&self) -> Result<(), ActuatorError> {
        self.send(&self.open_command).await
    }

    async fn close(&self) -> Result<(), ActuatorError> {
        self.send(&self.close_command).await
    }
}

#[cfg(test)]
#[path = "serial_tests.rs"]
mod tests;
