//! JSON-lines request loop.
//!
//! Each input line is one request, optionally carrying an `"id"` that is echoed on its
//! reply. Requests run as independent tasks, so replies arrive in completion order,
//! not input order. A single writer task owns the output.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::kernel::context::ServerContext;
use crate::kernel::dispatch::{dispatch, Reply, Request};

/// Serve requests from `input` until it ends or `shutdown` fires.
///
/// Returns once every in-flight request has been answered, handing `output` back.
pub async fn serve<R, W>(
    ctx: Arc<ServerContext>,
    input: R,
    output: W,
    shutdown: CancellationToken,
) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_replies(rx, output));
    let tracker = TaskTracker::new();
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line.context("reading requests")?,
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok((id, request)) => {
                let ctx = Arc::clone(&ctx);
                let tx = tx.clone();
                tracker.spawn(async move {
                    let reply = dispatch(&ctx, request).await;
                    match encode(&reply, id) {
                        Ok(text) => {
                            let _ = tx.send(text);
                        }
                        Err(e) => tracing::error!(error = %e, "Failed to encode reply"),
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed request");
                let reply = json!({
                    "type": "text",
                    "text": format!("Error: invalid request: {}", e),
                    "is_error": true,
                });
                let _ = tx.send(reply.to_string());
            }
        }
    }

    tracker.close();
    if !tracker.is_empty() {
        tracing::info!(in_flight = tracker.len(), "Waiting for in-flight requests");
    }
    tracker.wait().await;

    drop(tx);
    let output = writer.await.context("reply writer stopped")??;
    Ok(output)
}

fn parse_line(line: &str) -> serde_json::Result<(Option<Value>, Request)> {
    let mut value: Value = serde_json::from_str(line)?;
    let id = value.as_object_mut().and_then(|obj| obj.remove("id"));
    Ok((id, serde_json::from_value(value)?))
}

fn encode(reply: &Reply, id: Option<Value>) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(reply)?;
    if let (Some(id), Some(obj)) = (id, value.as_object_mut()) {
        obj.insert("id".to_string(), id);
    }
    serde_json::to_string(&value)
}

async fn write_replies<W>(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut output: W,
) -> std::io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = rx.recv().await {
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(output)
}
