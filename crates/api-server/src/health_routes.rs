use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "InvestLens backend ready")]
    pub message: String,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(healthcheck))
}

/// Confirm the service is reachable.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "System"
)]
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "InvestLens backend ready".to_string(),
    })
}
