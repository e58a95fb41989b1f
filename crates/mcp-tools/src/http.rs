//! JSON-RPC over HTTP: one message per `POST /mcp`

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::service::{parse_message, ToolService};

pub const MCP_PATH: &str = "/mcp";

pub fn router(service: ToolService) -> Router {
    Router::new()
        .route(MCP_PATH, post(handle_message))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Bind and serve until the process is stopped
pub async fn serve_http(service: ToolService, bind: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Tool service listening on http://{}{}", listener.local_addr()?, MCP_PATH);
    axum::serve(listener, router(service)).await?;
    Ok(())
}

// The body is taken raw so an unparsable message still gets a JSON-RPC parse
// error instead of axum's plain-text rejection.
async fn handle_message(State(service): State<ToolService>, body: Bytes) -> Response {
    let request = match parse_message(&body) {
        Ok(request) => request,
        Err(response) => return (StatusCode::BAD_REQUEST, Json(response)).into_response(),
    };

    match service.handle(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
