use anyhow::Result;
use async_trait::async_trait;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use confhub_agent_network::{AgentResult, SessionOrchestrator};
use confhub_common::SystemConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;

use crate::middleware::logging::{get_tracing_layer, logging_middleware};
use crate::openapi::ApiDoc;
use crate::routes::{chat, health};

/// Runs one chat turn to its final answer
#[async_trait]
pub trait TurnRunner: Send + Sync {
    async fn run_turn(&self, query: &str) -> AgentResult<String>;
}

#[async_trait]
impl TurnRunner for SessionOrchestrator {
    async fn run_turn(&self, query: &str) -> AgentResult<String> {
        SessionOrchestrator::run_turn(self, query).await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SystemConfig>,
    pub runner: Arc<dyn TurnRunner>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/api/v1/chat/invoke", post(chat::invoke_chat))
        .route("/api-doc/openapi.json", get(openapi_json))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(get_tracing_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub struct ChatServer {
    state: AppState,
}

impl ChatServer {
    /// Server whose turns use Gemini-backed agents
    pub fn new(config: SystemConfig) -> Self {
        let config = Arc::new(config);
        let runner = Arc::new(SessionOrchestrator::with_gemini(config.clone()));
        Self::with_runner(config, runner)
    }

    pub fn with_runner(config: Arc<SystemConfig>, runner: Arc<dyn TurnRunner>) -> Self {
        Self {
            state: AppState { config, runner },
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        let server = &self.state.config.server;
        let addr = format!("{}:{}", server.host, server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Chat server listening on http://{}", listener.local_addr()?);
        info!("OpenAPI document at http://{}/api-doc/openapi.json", listener.local_addr()?);

        axum::serve(
            listener,
            self.router().into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

        Ok(())
    }
}
