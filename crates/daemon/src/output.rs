// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision output as newline-delimited JSON

use gate_core::DecisionRecord;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Write each record as one JSON line until the channel closes.
///
/// Returns the writer so callers can inspect buffered output.
pub fn spawn_writer<W>(
    mut decisions: mpsc::Receiver<DecisionRecord>,
    mut writer: W,
) -> JoinHandle<std::io::Result<W>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(record) = decisions.recv().await {
            let mut line = serde_json::to_vec(&record)?;
            line.push(b'\n');
            writer.write_all(&line).await?;
            writer.flush().await?;
        }
        Ok(writer)
    })
}
