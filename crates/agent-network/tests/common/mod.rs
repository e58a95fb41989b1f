//! Shared fakes for the agent-network integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use confhub_agent_network::transport::{InboundEvent, InboundReceiver, StdioTransport, ToolTransport};
use confhub_agent_network::{AgentError, AgentResult, LanguageModel, SearchTool, SessionResult, ToolSession};
use confhub_common::protocol::{JsonRpcRequest, RequestId, ToolCallResult, ToolDefinition, GET_CONFERENCES_TOOL};
use confhub_common::ConferenceApiConfig;
use confhub_mcp_tools::{register_all_tools, Tool, ToolCallError, ToolService};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_PATH: &str = "/database/api/v1/conference";

/// Language model answering from a script, recording every prompt
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, _system: &str, prompt: &str) -> AgentResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::llm("no scripted reply left"))
    }
}

/// Search tool returning a fixed output and recording the queries
pub struct RecordingSearchTool {
    output: String,
    pub queries: Mutex<Vec<String>>,
}

impl RecordingSearchTool {
    pub fn new(output: &str) -> Arc<Self> {
        Arc::new(Self {
            output: output.to_string(),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl SearchTool for RecordingSearchTool {
    fn search(&self, search_query: &str) -> String {
        self.queries.lock().unwrap().push(search_query.to_string());
        self.output.clone()
    }
}

/// Transport that never answers; reports what it was asked to send and cancel
pub struct SilentTransport {
    sent: mpsc::UnboundedSender<JsonRpcRequest>,
    cancelled: mpsc::UnboundedSender<RequestId>,
    // keeps the inbound channel open
    _inbound: mpsc::UnboundedSender<InboundEvent>,
}

pub struct SilentProbe {
    pub sent: mpsc::UnboundedReceiver<JsonRpcRequest>,
    pub cancelled: mpsc::UnboundedReceiver<RequestId>,
}

pub fn silent_session() -> (ToolSession, SilentProbe) {
    let (sent_tx, sent) = mpsc::unbounded_channel();
    let (cancelled_tx, cancelled) = mpsc::unbounded_channel();
    let (inbound_tx, inbound): (_, InboundReceiver) = mpsc::unbounded_channel();
    let transport = SilentTransport {
        sent: sent_tx,
        cancelled: cancelled_tx,
        _inbound: inbound_tx,
    };
    let session = ToolSession::start(Box::new(transport), inbound);
    (session, SilentProbe { sent, cancelled })
}

#[async_trait]
impl ToolTransport for SilentTransport {
    async fn send(&mut self, message: &JsonRpcRequest) -> SessionResult<()> {
        let _ = self.sent.send(message.clone());
        Ok(())
    }

    async fn cancel(&mut self, id: &RequestId) -> SessionResult<()> {
        let _ = self.cancelled.send(id.clone());
        Ok(())
    }

    async fn close(&mut self) -> SessionResult<()> {
        Ok(())
    }
}

/// `get_conferences` stand-in that echoes its query after a delay taken
/// from the `delay` key, so responses can be made to arrive out of order
pub struct EchoConferenceTool;

#[async_trait]
impl Tool for EchoConferenceTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: GET_CONFERENCES_TOOL.to_string(),
            title: None,
            description: "echo".to_string(),
            input_schema: json!({"type": "object"}),
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolCallResult, ToolCallError> {
        let query = arguments["searchQuery"].as_str().unwrap_or_default().to_string();
        let delay = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("delay="))
            .and_then(|ms| ms.parse::<u64>().ok())
            .unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(ToolCallResult::text(format!("echo:{}", query)))
    }
}

/// Session over an in-process stdio tool service
pub fn duplex_session(service: ToolService) -> ToolSession {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    tokio::spawn(confhub_mcp_tools::stdio::serve(service, server_read, server_write));
    let (client_read, client_write) = tokio::io::split(client);
    let (transport, inbound) = StdioTransport::from_io(client_read, client_write);
    ToolSession::start(Box::new(transport), inbound)
}

pub fn echo_service() -> ToolService {
    ToolService::new(vec![Arc::new(EchoConferenceTool)])
}

pub fn us_conferences() -> Value {
    json!([
        {"title": "International Conference on Machine Learning", "acronym": "ICML", "country": "United States"},
        {"title": "Conference on Computer Vision and Pattern Recognition", "acronym": "CVPR", "country": "United States"},
        {"title": "USENIX Security Symposium", "acronym": "USENIX Security", "country": "United States"}
    ])
}

/// Upstream API answering every GET with `body`
pub async fn mock_conference_api(body: Value) -> (MockServer, ConferenceApiConfig) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    let config = ConferenceApiConfig {
        base_url: format!("{}{}", server.uri(), API_PATH),
        timeout_secs: 5,
    };
    (server, config)
}

/// Real tool service on an ephemeral port; returns its `/mcp` URL
pub async fn spawn_http_tool_service(api: &ConferenceApiConfig) -> String {
    let service = ToolService::new(register_all_tools(api).unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, confhub_mcp_tools::http::router(service))
            .await
            .unwrap();
    });
    format!("http://{}{}", addr, confhub_mcp_tools::http::MCP_PATH)
}
