use async_stream::stream;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use chrono::Utc;
use confhub_common::{ChatRequest, ErrorResponse, StreamEvent};
use futures::Stream;
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::{error, info, instrument, warn};

use crate::server::AppState;

pub const KICKOFF_STEP: &str = "crew_kickoff";
pub const KICKOFF_MESSAGE: &str = "Crew is starting the task...";
/// The only failure text a client ever sees; details stay in the logs
pub const GENERIC_ERROR: &str = "An unexpected error occurred while processing your request.";

/// Run one chat turn and stream its progress
///
/// The response is `text/event-stream`. Every event is a `data:` line holding
/// one JSON object:
///
/// 1. `{"type": "status", "step": "crew_kickoff", "message": ...}` as soon as work starts
/// 2. exactly one `{"type": "result", "message": ...}` or `{"type": "error", "message": ...}`
///
/// Requests that cannot start (unparsable body, empty query) are rejected
/// with an `ErrorResponse` before any event is sent.
#[utoipa::path(
    post,
    path = "/api/v1/chat/invoke",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Server-sent events, one JSON `StreamEvent` per `data:` line", body = StreamEvent, content_type = "text/event-stream"),
        (status = 422, description = "Empty query", body = ErrorResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse)
    ),
    tag = "chat"
)]
#[instrument(skip_all)]
pub async fn invoke_chat(
    State(state): State<AppState>,
    client: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected chat request body");
            return reject(rejection.status(), rejection.body_text(), "INVALID_BODY");
        }
    };

    if request.query.trim().is_empty() {
        warn!(user_id = %request.user_id, "Rejected empty query");
        return reject(StatusCode::UNPROCESSABLE_ENTITY, "query must not be empty".to_string(), "EMPTY_QUERY");
    }

    let client_host = client
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    info!(
        client_host = %client_host,
        user_id = %request.user_id,
        conversation_id = %request.conversation_id,
        query = %request.query,
        "Received chat request"
    );

    Sse::new(turn_events(state, request))
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn turn_events(state: AppState, request: ChatRequest) -> impl Stream<Item = Result<Event, Infallible>> {
    stream! {
        yield Ok(to_event(&StreamEvent::status(KICKOFF_STEP, KICKOFF_MESSAGE)));

        // dropping this stream (client gone) drops the turn and its session
        let terminal = match state.runner.run_turn(&request.query).await {
            Ok(answer) => {
                info!(user_id = %request.user_id, "Turn finished, sending result");
                StreamEvent::result(answer)
            }
            Err(e) => {
                error!(
                    user_id = %request.user_id,
                    conversation_id = %request.conversation_id,
                    error = %e,
                    error_debug = ?e,
                    "Chat turn failed"
                );
                StreamEvent::error(GENERIC_ERROR)
            }
        };
        yield Ok(to_event(&terminal));
    }
}

fn to_event(event: &StreamEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|e| {
        error!(error = %e, "Failed to encode stream event");
        Event::default().data(format!(
            r#"{{"type":"error","message":"{}"}}"#,
            GENERIC_ERROR
        ))
    })
}

fn reject(status: StatusCode, error: String, code: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error,
            code: Some(code.to_string()),
            timestamp: Utc::now(),
        }),
    )
        .into_response()
}
