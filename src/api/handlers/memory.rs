use crate::{
    AppState,
    types::{ClearMemoryResponse, MemoryResponse},
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemoryQuery {
    /// Maximum number of entries to return
    pub limit: Option<usize>,
}

/// Recent exchanges, most recent first
#[utoipa::path(
    get,
    path = "/memory",
    params(MemoryQuery),
    responses(
        (status = 200, description = "Remembered exchanges", body = MemoryResponse)
    ),
    tag = "memory"
)]
pub async fn get_memory(
    State(state): State<AppState>,
    Query(params): Query<MemoryQuery>,
) -> Json<MemoryResponse> {
    let entries = state.memory.recent(params.limit);
    Json(MemoryResponse {
        count: entries.len(),
        entries,
        capacity: state.memory.capacity(),
    })
}

/// Forget all remembered exchanges
#[utoipa::path(
    delete,
    path = "/memory",
    responses(
        (status = 200, description = "Number of entries removed", body = ClearMemoryResponse)
    ),
    tag = "memory"
)]
pub async fn clear_memory(State(state): State<AppState>) -> Json<ClearMemoryResponse> {
    let cleared = state.memory.clear();
    info!(cleared, "Memory cleared");
    Json(ClearMemoryResponse { cleared })
}
