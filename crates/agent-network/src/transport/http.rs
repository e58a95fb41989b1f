//! JSON-RPC over HTTP to a long-running tool service (`POST /mcp`)

use async_trait::async_trait;
use confhub_common::protocol::{JsonRpcRequest, JsonRpcResponse, RequestId};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, instrument};

use super::{InboundEvent, InboundReceiver, InboundSender, ToolTransport};
use crate::error::{SessionError, SessionResult};

pub struct HttpTransport {
    url: String,
    client: Client,
    inbound: InboundSender,
    in_flight: HashMap<RequestId, AbortHandle>,
}

impl HttpTransport {
    #[instrument(skip_all, fields(url = %url))]
    pub fn new(url: &str, timeout: Duration) -> SessionResult<(Self, InboundReceiver)> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::transport(format!("failed to build HTTP client: {}", e)))?;

        info!("Connecting to tool service over HTTP");
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            url: url.to_string(),
            client,
            inbound: tx,
            in_flight: HashMap::new(),
        };
        Ok((transport, rx))
    }
}

#[async_trait]
impl ToolTransport for HttpTransport {
    async fn send(&mut self, message: &JsonRpcRequest) -> SessionResult<()> {
        self.in_flight.retain(|_, handle| !handle.is_finished());

        let request = self.client.post(&self.url).json(message);
        let inbound = self.inbound.clone();
        let id = message.id.clone();
        let method = message.method.clone();

        let task = tokio::spawn(async move {
            let outcome = post(request).await;
            match (outcome, id) {
                (Ok(Some(response)), _) => {
                    let _ = inbound.send(InboundEvent::Response(response));
                }
                (Ok(None), Some(id)) => {
                    let _ = inbound.send(InboundEvent::Failed {
                        id,
                        reason: "tool service accepted the request without answering".to_string(),
                    });
                }
                (Ok(None), None) => {}
                (Err(reason), Some(id)) => {
                    let _ = inbound.send(InboundEvent::Failed { id, reason });
                }
                (Err(reason), None) => debug!(%method, %reason, "Notification delivery failed"),
            }
        });

        if let Some(id) = &message.id {
            self.in_flight.insert(id.clone(), task.abort_handle());
        }
        Ok(())
    }

    async fn cancel(&mut self, id: &RequestId) -> SessionResult<()> {
        // dropping the connection is what the server observes
        if let Some(handle) = self.in_flight.remove(id) {
            handle.abort();
            debug!(%id, "Aborted HTTP request");
        }
        Ok(())
    }

    async fn close(&mut self) -> SessionResult<()> {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        let _ = self.inbound.send(InboundEvent::Closed("session closed".to_string()));
        Ok(())
    }
}

/// `Ok(None)` is a 202 with no body, the answer to a notification
async fn post(request: reqwest::RequestBuilder) -> Result<Option<JsonRpcResponse>, String> {
    let response = request.send().await.map_err(|e| e.to_string())?;

    let status = response.status();
    if status == StatusCode::ACCEPTED || status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    // JSON-RPC errors may come back with a 4xx status but still carry a body
    let body = response.bytes().await.map_err(|e| e.to_string())?;
    match serde_json::from_slice::<JsonRpcResponse>(&body) {
        Ok(response) => Ok(Some(response)),
        Err(_) if !status.is_success() => Err(format!(
            "tool service returned status {}: {}",
            status,
            String::from_utf8_lossy(&body)
        )),
        Err(e) => Err(format!("undecodable response from tool service: {}", e)),
    }
}
