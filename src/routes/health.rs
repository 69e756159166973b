use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Liveness probe: `GET /health`. Touches no upstream.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
