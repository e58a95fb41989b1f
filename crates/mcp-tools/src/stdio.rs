//! Newline-delimited JSON-RPC over a byte stream (stdin/stdout when spawned
//! by the host)
//!
//! Every request runs in its own task so a slow upstream search never blocks
//! `ping` or a second call. Responses funnel through a single writer task.
//! The read loop owns the in-flight table, which is what lets
//! `notifications/cancelled` abort the matching task.

use confhub_common::protocol::{
    methods, CancelledParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
};
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::service::{parse_message, ToolService};

struct InFlight {
    generation: u64,
    handle: AbortHandle,
}

/// Serve the process's own stdin/stdout until stdin closes
pub async fn serve_stdio(service: ToolService) -> std::io::Result<()> {
    serve(service, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve one connection until `reader` reaches EOF.
///
/// Requests still running at EOF are aborted; responses already produced are
/// flushed before returning.
pub async fn serve<R, W>(service: ToolService, reader: R, writer: W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    let writer_task = tokio::spawn(write_responses(writer, out_rx));

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(RequestId, u64)>();
    let mut in_flight: HashMap<RequestId, InFlight> = HashMap::new();
    let mut next_generation: u64 = 0;

    let mut lines = BufReader::new(reader).lines();
    info!("Tool service listening on stdio");

    let read_result = loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(raw = %line, "Received raw JSON-RPC message");

                let request = match parse_message(line.as_bytes()) {
                    Ok(request) => request,
                    Err(response) => {
                        let _ = out_tx.send(response);
                        continue;
                    }
                };

                let Some(id) = request.id.clone() else {
                    if request.method == methods::CANCELLED {
                        cancel(&mut in_flight, request.params);
                    } else {
                        service.handle(request).await;
                    }
                    continue;
                };

                if in_flight.get(&id).is_some_and(|entry| !entry.handle.is_finished()) {
                    warn!(%id, "Rejecting request with an id that is already in flight");
                    let _ = out_tx.send(JsonRpcResponse::error(
                        Some(id.clone()),
                        JsonRpcError::new(
                            JsonRpcError::INVALID_REQUEST,
                            format!("Duplicate request id: {}", id),
                        ),
                    ));
                    continue;
                }

                next_generation += 1;
                let generation = next_generation;
                let service = service.clone();
                let out_tx = out_tx.clone();
                let done_tx = done_tx.clone();
                let task_id = id.clone();
                let handle = tokio::spawn(async move {
                    if let Some(response) = service.handle(request).await {
                        let _ = out_tx.send(response);
                    }
                    let _ = done_tx.send((task_id, generation));
                });
                in_flight.insert(id, InFlight { generation, handle: handle.abort_handle() });
            }
            Some((id, generation)) = done_rx.recv() => {
                if in_flight.get(&id).is_some_and(|entry| entry.generation == generation) {
                    in_flight.remove(&id);
                }
            }
        }
    };

    if !in_flight.is_empty() {
        info!(count = in_flight.len(), "Input closed, aborting in-flight requests");
    }
    for (_, entry) in in_flight.drain() {
        entry.handle.abort();
    }

    drop(out_tx);
    drop(done_tx);
    if let Err(e) = writer_task.await {
        error!(error = %e, "Response writer task failed");
    }

    info!("Tool service stdio loop finished");
    read_result
}

fn cancel(in_flight: &mut HashMap<RequestId, InFlight>, params: Option<serde_json::Value>) {
    let params = match params.map(serde_json::from_value::<CancelledParams>) {
        Some(Ok(params)) => params,
        _ => {
            warn!("Ignoring malformed cancellation notification");
            return;
        }
    };

    match in_flight.remove(&params.request_id) {
        Some(entry) => {
            entry.handle.abort();
            info!(
                request_id = %params.request_id,
                reason = params.reason.as_deref().unwrap_or(""),
                "Cancelled in-flight request"
            );
        }
        None => debug!(request_id = %params.request_id, "Cancellation for unknown or finished request"),
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = match serde_json::to_vec(&response) {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "Failed to serialize response");
                continue;
            }
        };
        line.push(b'\n');

        if let Err(e) = writer.write_all(&line).await {
            error!(error = %e, "Failed to write response, stopping writer");
            return;
        }
        if let Err(e) = writer.flush().await {
            error!(error = %e, "Failed to flush response, stopping writer");
            return;
        }
    }
}
