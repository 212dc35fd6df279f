use crate::AppState;
use crate::api::handlers::{ask, health, memory};
use axum::{
    Router,
    routing::{get, post},
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/ask", post(ask::ask))
        .route(
            "/memory",
            get(memory::get_memory).delete(memory::clear_memory),
        )
}
