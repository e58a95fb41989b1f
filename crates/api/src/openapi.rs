//! OpenAPI document for the chat API, generated from the handlers and wire
//! types with utoipa

use confhub_common::{ChatRequest, ErrorResponse, HealthStatus, StreamEvent};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "AI Core Service",
        description = "
Routes chat queries to a manager agent that answers directly or delegates
conference searches to a specialist backed by the conference tool service.

`POST /api/v1/chat/invoke` answers with server-sent events: one `status`
event when the turn starts, then exactly one `result` or `error` event.
        ",
        version = "1.0.0"
    ),
    paths(
        crate::routes::chat::invoke_chat,
        crate::routes::health::root
    ),
    components(schemas(ChatRequest, StreamEvent, ErrorResponse, HealthStatus)),
    tags(
        (name = "chat", description = "Chat turns streamed as server-sent events"),
        (name = "health", description = "Service liveness")
    )
)]
pub struct ApiDoc;
