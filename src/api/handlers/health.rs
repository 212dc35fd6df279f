use crate::{AppState, types::HealthResponse};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        llm: state.agent.model_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Banner", body = RootResponse)
    ),
    tag = "system"
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "S.A.G.E (Search-Augmented Gemini Endpoint) is running".to_string(),
    })
}
