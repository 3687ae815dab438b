//! Health check handler.

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

/// Liveness probe: `200 {status:"OK", time:<ISO timestamp>}`.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "OK",
            "time": Utc::now().to_rfc3339(),
        })),
    )
}
