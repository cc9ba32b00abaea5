use axum::http::StatusCode;
use tracing::info;

/// Health check
///
/// Returns 200 with an empty body. Useful to check that the service is up.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn get_health() -> StatusCode {
    info!("GET: /health endpoint called.");
    StatusCode::OK
}
