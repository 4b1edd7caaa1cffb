use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::debug;

/// Answers unmatched routes with a JSON 404.
pub async fn endpoint_not_found() -> impl IntoResponse {
    debug!("No route matched");
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
