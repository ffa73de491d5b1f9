// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detection ingress: newline-delimited JSON from the recognition pipeline
//!
//! Lines are parsed off the main loop and forwarded through a bounded
//! channel. A full channel drops the detection instead of stalling the
//! producer.

use chrono::Utc;
use gate_core::{DetectionError, DetectionEvent, RawDetection};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Why an input line was skipped
#[derive(Debug, Error)]
pub enum IngressError {
    #[error("malformed detection: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Detection(#[from] DetectionError),
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<DetectionEvent>, IngressError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let raw: RawDetection = serde_json::from_str(line)?;
    Ok(Some(raw.into_event(Utc::now())?))
}

/// Counters reported when the input ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngressStats {
    pub forwarded: u64,
    pub malformed: u64,
    pub dropped: u64,
}

/// Read detections until EOF, forwarding them to `intake`.
///
/// The sender is dropped on return, so the receiver observes the end of
/// input as a closed channel.
pub fn spawn_reader<R>(reader: R, intake: mpsc::Sender<DetectionEvent>) -> JoinHandle<IngressStats>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut stats = IngressStats::default();
        let mut lines = reader.lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "detection input failed");
                    break;
                }
            };

            let event = match parse_line(&line) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(e) => {
                    stats.malformed += 1;
                    warn!(error = %e, "skipping input line");
                    continue;
                }
            };

            match intake.try_send(event) {
                Ok(()) => stats.forwarded += 1,
                Err(TrySendError::Full(event)) => {
                    stats.dropped += 1;
                    warn!(plate = %event.plate, "intake full, detection dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("intake closed, stopping reader");
                    break;
                }
            }
        }

        info!(
            forwarded = stats.forwarded,
            malformed = stats.malformed,
            dropped = stats.dropped,
            "detection input closed"
        );
        stats
    })
}

#[cfg(test)]
#[path = "ingress_tests.rs"]
mod tests;
