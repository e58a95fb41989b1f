//! Conference tool service
//!
//! Exposes the `get_conferences` tool over JSON-RPC 2.0. The same
//! [`ToolService`] backs two transports: newline-delimited messages on
//! stdio (the host spawns this process per chat turn) and `POST /mcp` over
//! HTTP (a long-running shared instance).

pub mod conference;
pub mod error;
pub mod http;
pub mod service;
pub mod stdio;
pub mod upstream;

use async_trait::async_trait;
use confhub_common::protocol::{ToolCallResult, ToolDefinition};
use confhub_common::ConferenceApiConfig;
use serde_json::Value;
use std::sync::Arc;

pub use conference::ConferenceSearchTool;
pub use error::{ToolCallError, UpstreamError};
pub use service::ToolService;
pub use upstream::{ConferenceApiClient, SearchOutput, NO_RESULTS};

/// A tool callable through `tools/call`
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Run the tool. Failures of the tool's own work are reported inside the
    /// returned result; `Err` is reserved for arguments that do not fit.
    async fn call(&self, arguments: Value) -> Result<ToolCallResult, ToolCallError>;
}

pub fn register_all_tools(config: &ConferenceApiConfig) -> Result<Vec<Arc<dyn Tool>>, UpstreamError> {
    let client = ConferenceApiClient::new(config)?;
    Ok(vec![Arc::new(ConferenceSearchTool::new(client))])
}
