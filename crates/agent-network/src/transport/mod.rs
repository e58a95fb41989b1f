//! Ways of reaching the conference tool service
//!
//! A transport only moves messages. Correlating responses with callers is
//! the session actor's job: a transport pushes whatever comes back onto the
//! inbound channel it handed out at construction.

pub mod http;
pub mod stdio;

use async_trait::async_trait;
use confhub_common::protocol::{JsonRpcRequest, JsonRpcResponse, RequestId};
use tokio::sync::mpsc;

use crate::error::SessionResult;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

/// Something that arrived from the tool service
#[derive(Debug)]
pub enum InboundEvent {
    Response(JsonRpcResponse),
    /// The request with this id failed in the transport itself
    Failed { id: RequestId, reason: String },
    /// The channel is gone; no further events follow
    Closed(String),
}

pub type InboundReceiver = mpsc::UnboundedReceiver<InboundEvent>;
pub(crate) type InboundSender = mpsc::UnboundedSender<InboundEvent>;

/// Outbound half of a connection to the tool service.
///
/// Owned by exactly one session actor, hence `&mut self`.
#[async_trait]
pub trait ToolTransport: Send + 'static {
    /// Send a request or notification. Returning `Ok` means the message left,
    /// not that it was answered.
    async fn send(&mut self, message: &JsonRpcRequest) -> SessionResult<()>;

    /// The caller gave up on `id`; stop the remote work if possible
    async fn cancel(&mut self, id: &RequestId) -> SessionResult<()>;

    /// Release the connection. Called once, after which the transport is dropped.
    async fn close(&mut self) -> SessionResult<()>;
}
