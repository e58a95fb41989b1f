//! Transport-independent JSON-RPC request handling

use confhub_common::protocol::{
    methods, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    ServerInfo, ToolCallParams, ToolsListResult, JSONRPC_VERSION, PROTOCOL_VERSION,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ToolCallError;
use crate::Tool;

pub const SERVER_NAME: &str = "ConferenceInformationService";
const INSTRUCTIONS: &str = "A specialized service providing tools to search for and retrieve information about technology conferences.";

/// Parse one raw message, or build the error response to send back instead
pub fn parse_message(raw: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(raw).map_err(|e| {
        error!(error = %e, "Failed to parse JSON-RPC message");
        JsonRpcResponse::error(None, JsonRpcError::new(JsonRpcError::PARSE_ERROR, e.to_string()))
    })?;

    let id = value
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

    serde_json::from_value::<JsonRpcRequest>(value).map_err(|e| {
        warn!(error = %e, "Message is not a JSON-RPC request");
        JsonRpcResponse::error(id, JsonRpcError::new(JsonRpcError::INVALID_REQUEST, e.to_string()))
    })
}

/// Dispatches JSON-RPC requests to the registered tools.
///
/// Holds no per-request state; clones share the tool list.
#[derive(Clone)]
pub struct ToolService {
    tools: Arc<Vec<Arc<dyn Tool>>>,
}

impl ToolService {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }

    fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.definition().name == name)
    }

    /// Handle one message. Returns `None` for notifications.
    #[instrument(skip(self, request), fields(method = %request.method, id = ?request.id))]
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            warn!(got_version = %request.jsonrpc, "Invalid JSON-RPC version");
            return Some(JsonRpcResponse::error(
                Some(id),
                JsonRpcError::with_data(
                    JsonRpcError::INVALID_REQUEST,
                    "Invalid JSON-RPC version",
                    json!({"expected": JSONRPC_VERSION, "got": request.jsonrpc}),
                ),
            ));
        }

        let start = Instant::now();
        let response = match request.method.as_str() {
            methods::INITIALIZE => JsonRpcResponse::success(id, self.initialize_result()),
            methods::PING => JsonRpcResponse::success(id, json!({})),
            methods::TOOLS_LIST => {
                let result = ToolsListResult {
                    tools: self.tools.iter().map(|tool| tool.definition()).collect(),
                };
                JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or(Value::Null))
            }
            methods::TOOLS_CALL => self.call_tool(id, request.params).await,
            other => {
                warn!(method = %other, "Unknown method");
                JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::new(JsonRpcError::METHOD_NOT_FOUND, format!("Method not found: {}", other)),
                )
            }
        };

        info!(
            elapsed_ms = %start.elapsed().as_millis(),
            is_error = response.error.is_some(),
            "JSON-RPC request completed"
        );
        Some(response)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => info!("Client finished initialization"),
            // cancellation needs the transport's in-flight table; transports intercept it
            methods::CANCELLED => debug!("Cancellation notification reached the service"),
            other => warn!(method = %other, "Ignoring unknown notification"),
        }
    }

    fn initialize_result(&self) -> Value {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: json!({ "tools": { "listChanged": false } }),
            instructions: Some(INSTRUCTIONS.to_string()),
        };
        serde_json::to_value(result).unwrap_or(Value::Null)
    }

    async fn call_tool(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => return invalid_params(id, e.to_string()),
            None => return invalid_params(id, "missing params".to_string()),
        };

        let Some(tool) = self.find_tool(&params.name) else {
            return invalid_params(id, ToolCallError::UnknownTool(params.name).to_string());
        };

        match tool.call(params.arguments).await {
            Ok(result) => JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or(Value::Null)),
            Err(e) => invalid_params(id, e.to_string()),
        }
    }
}

fn invalid_params(id: RequestId, message: String) -> JsonRpcResponse {
    JsonRpcResponse::error(Some(id), JsonRpcError::new(JsonRpcError::INVALID_PARAMS, message))
}
