//! One live connection to the tool service, owned by a single actor task
//!
//! The actor owns the transport and the table of pending calls; everything
//! else talks to it through a [`SessionHandle`]. Responses are matched to
//! callers by request id only, never by arrival order.

use confhub_common::protocol::{
    methods, InitializeResult, JsonRpcRequest, JsonRpcResponse, RequestId, ToolCallResult,
    ToolDefinition, ToolsListResult, PROTOCOL_VERSION,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::{SessionError, SessionResult};
use crate::transport::{InboundEvent, InboundReceiver, ToolTransport};

type Reply = oneshot::Sender<SessionResult<JsonRpcResponse>>;

enum Command {
    Call { request: JsonRpcRequest, reply: Reply },
    Notify { notification: JsonRpcRequest, reply: oneshot::Sender<SessionResult<()>> },
    Cancel { id: RequestId },
    Shutdown { done: Option<oneshot::Sender<()>> },
}

/// Cloneable sender into the session actor.
///
/// Once the session is closed every call fails with [`SessionError::Closed`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

/// Sends `Cancel` if the call future is dropped before its reply arrives
struct CancelOnDrop {
    id: Option<RequestId>,
    commands: mpsc::UnboundedSender<Command>,
}

impl CancelOnDrop {
    fn disarm(mut self) {
        self.id = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            debug!(%id, "Call abandoned, cancelling");
            let _ = self.commands.send(Command::Cancel { id });
        }
    }
}

impl SessionHandle {
    /// Send a request and wait for the response carrying the same id
    pub async fn call(&self, request: JsonRpcRequest) -> SessionResult<JsonRpcResponse> {
        let id = request
            .id
            .clone()
            .ok_or_else(|| SessionError::transport("a call needs a request id"))?;

        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Call { request, reply })
            .map_err(|_| SessionError::Closed)?;

        let guard = CancelOnDrop {
            id: Some(id),
            commands: self.commands.clone(),
        };
        let result = response.await;
        guard.disarm();

        result.map_err(|_| SessionError::Closed)?
    }

    /// Send a notification; no response is expected
    pub async fn notify(&self, notification: JsonRpcRequest) -> SessionResult<()> {
        let (reply, sent) = oneshot::channel();
        self.commands
            .send(Command::Notify { notification, reply })
            .map_err(|_| SessionError::Closed)?;
        sent.await.map_err(|_| SessionError::Closed)?
    }

    /// `tools/call` of `get_conferences`; returns the tool's text verbatim.
    ///
    /// Upstream failures come back as text too; only protocol-level problems
    /// are errors here.
    #[instrument(skip(self))]
    pub async fn get_conferences(&self, search_query: &str) -> SessionResult<String> {
        let request = JsonRpcRequest::get_conferences(RequestId::random(), search_query);
        let result: ToolCallResult = result_of(self.call(request).await?)?;
        if result.is_error {
            debug!("Tool reported an error result");
        }
        result
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| SessionError::malformed("tool result has no text content"))
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

fn result_of<T: DeserializeOwned>(response: JsonRpcResponse) -> SessionResult<T> {
    if let Some(error) = response.error {
        return Err(SessionError::Rpc(error));
    }
    let result = response
        .result
        .ok_or_else(|| SessionError::malformed("response has neither result nor error"))?;
    serde_json::from_value(result).map_err(|e| SessionError::malformed(e.to_string()))
}

/// Owner of a session actor. Dropping it shuts the actor down.
pub struct ToolSession {
    handle: SessionHandle,
    actor: Option<JoinHandle<()>>,
}

impl ToolSession {
    /// Start the actor for an already connected transport
    pub fn start(transport: Box<dyn ToolTransport>, inbound: InboundReceiver) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = tokio::spawn(run_actor(transport, rx, inbound));
        Self {
            handle: SessionHandle { commands: tx },
            actor: Some(actor),
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// `initialize` handshake followed by `notifications/initialized`
    #[instrument(skip(self))]
    pub async fn initialize(&self, timeout: Duration) -> SessionResult<InitializeResult> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "confhub-agent-network",
                "version": env!("CARGO_PKG_VERSION"),
            }
        });
        let request = JsonRpcRequest::request(RequestId::random(), methods::INITIALIZE, Some(params));

        let response = tokio::time::timeout(timeout, self.handle.call(request))
            .await
            .map_err(|_| SessionError::Timeout {
                operation: "initialize".to_string(),
                after: timeout,
            })??;
        let result: InitializeResult = result_of(response)?;

        self.handle
            .notify(JsonRpcRequest::notification(methods::INITIALIZED, None))
            .await?;

        info!(
            server = %result.server_info.name,
            server_version = %result.server_info.version,
            protocol = %result.protocol_version,
            "Tool session initialized"
        );
        Ok(result)
    }

    pub async fn list_tools(&self) -> SessionResult<Vec<ToolDefinition>> {
        let request = JsonRpcRequest::request(RequestId::random(), methods::TOOLS_LIST, None);
        let list: ToolsListResult = result_of(self.handle.call(request).await?)?;
        Ok(list.tools)
    }

    /// Fail every pending call, release the transport and wait for the actor
    pub async fn close(mut self) {
        let Some(actor) = self.actor.take() else {
            return;
        };
        let (done, finished) = oneshot::channel();
        if self.handle.commands.send(Command::Shutdown { done: Some(done) }).is_ok() {
            let _ = finished.await;
        }
        if let Err(e) = actor.await {
            warn!(error = %e, "Session actor ended abnormally");
        }
    }
}

impl Drop for ToolSession {
    fn drop(&mut self) {
        if self.actor.take().is_some() {
            debug!("Tool session dropped without close, shutting down");
            let _ = self.handle.commands.send(Command::Shutdown { done: None });
        }
    }
}

async fn run_actor(
    mut transport: Box<dyn ToolTransport>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut inbound: InboundReceiver,
) {
    let mut pending: HashMap<RequestId, Reply> = HashMap::new();

    let done = loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Call { request, reply }) => {
                    let Some(id) = request.id.clone() else {
                        let _ = reply.send(Err(SessionError::transport("a call needs a request id")));
                        continue;
                    };
                    if pending.contains_key(&id) {
                        warn!(%id, "Rejecting duplicate request id");
                        let _ = reply.send(Err(SessionError::DuplicateRequestId(id)));
                        continue;
                    }
                    match transport.send(&request).await {
                        Ok(()) => {
                            pending.insert(id, reply);
                        }
                        Err(e) => {
                            let _ = reply.send(Err(e));
                        }
                    }
                }
                Some(Command::Notify { notification, reply }) => {
                    let _ = reply.send(transport.send(&notification).await);
                }
                Some(Command::Cancel { id }) => {
                    if pending.remove(&id).is_some() {
                        if let Err(e) = transport.cancel(&id).await {
                            warn!(%id, error = %e, "Failed to forward cancellation");
                        }
                    }
                }
                Some(Command::Shutdown { done }) => break done,
                None => break None,
            },
            event = inbound.recv() => match event {
                Some(InboundEvent::Response(response)) => match response.id.clone() {
                    Some(id) => match pending.remove(&id) {
                        Some(reply) => {
                            let _ = reply.send(Ok(response));
                        }
                        None => debug!(%id, "Dropping response for a call nobody waits on"),
                    },
                    None => warn!(error = ?response.error, "Tool service sent a response without id"),
                },
                Some(InboundEvent::Failed { id, reason }) => {
                    if let Some(reply) = pending.remove(&id) {
                        let _ = reply.send(Err(SessionError::Transport(reason)));
                    }
                }
                Some(InboundEvent::Closed(reason)) => {
                    warn!(%reason, "Tool service connection lost");
                    for (_, reply) in pending.drain() {
                        let _ = reply.send(Err(SessionError::Transport(reason.clone())));
                    }
                    break None;
                }
                None => break None,
            },
        }
    };

    // stop accepting new work before the slow part of teardown
    commands.close();
    for (_, reply) in pending.drain() {
        let _ = reply.send(Err(SessionError::Closed));
    }
    while let Ok(command) = commands.try_recv() {
        match command {
            Command::Call { reply, .. } => {
                let _ = reply.send(Err(SessionError::Closed));
            }
            Command::Notify { reply, .. } => {
                let _ = reply.send(Err(SessionError::Closed));
            }
            Command::Shutdown { done: Some(done) } => {
                let _ = done.send(());
            }
            Command::Cancel { .. } | Command::Shutdown { done: None } => {}
        }
    }

    if let Err(e) = transport.close().await {
        warn!(error = %e, "Error closing tool transport");
    }
    info!("Tool session closed");

    if let Some(done) = done {
        let _ = done.send(());
    }
}
