use axum::Json;
use confhub_common::HealthStatus;
use tracing::info;

pub const RUNNING: &str = "AI Core Service is running";

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = HealthStatus)
    ),
    tag = "health"
)]
pub async fn root() -> Json<HealthStatus> {
    info!("Root endpoint called");
    Json(HealthStatus {
        status: RUNNING.to_string(),
    })
}
