//! Shared helpers for the chat API tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use confhub_agent_network::{AgentError, AgentResult, LanguageModel};
use confhub_api::{build_router, AppState, TurnRunner};
use confhub_common::{StreamEvent, SystemConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Turn runner with a canned outcome; records the queries it was given
pub struct FakeRunner {
    outcome: Result<String, String>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(answer.to_string()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(reason.to_string()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TurnRunner for FakeRunner {
    async fn run_turn(&self, query: &str) -> AgentResult<String> {
        self.queries.lock().unwrap().push(query.to_string());
        self.outcome.clone().map_err(AgentError::llm)
    }
}

pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
        })
    }
}

impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, _system: &str, _prompt: &str) -> AgentResult<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::llm("no scripted reply left"))
    }
}

pub fn app(runner: Arc<dyn TurnRunner>) -> Router {
    app_with_config(Arc::new(SystemConfig::default()), runner)
}

pub fn app_with_config(config: Arc<SystemConfig>, runner: Arc<dyn TurnRunner>) -> Router {
    build_router(AppState { config, runner })
}

pub fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/chat/invoke")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn chat_body(query: &str) -> String {
    serde_json::json!({
        "query": query,
        "user_id": "user-1",
        "conversation_id": "conversation-1",
    })
    .to_string()
}

/// Send a request and decode every `data:` line of the SSE response
pub async fn collect_events(app: Router, request: Request<Body>) -> Vec<StreamEvent> {
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"), "got {}", content_type);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}
