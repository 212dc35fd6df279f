//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for S.A.G.E, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! - `POST /ask` - Answer a query, enriched with weather / Wikipedia facts
//! - `GET /memory` - Recent exchanges, most recent first (`?limit=N`)
//! - `DELETE /memory` - Forget all remembered exchanges
//! - `GET /health` - Liveness and active model
//! - `GET /` - Banner message
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

use utoipa::OpenApi;

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

/// OpenAPI description of the HTTP surface
#[derive(OpenApi)]
#[openapi(
    info(title = "S.A.G.E", description = "Search-Augmented Gemini Endpoint"),
    paths(
        handlers::ask::ask,
        handlers::memory::get_memory,
        handlers::memory::clear_memory,
        handlers::health::health,
        handlers::health::root,
    ),
    components(schemas(
        crate::types::AskRequest,
        crate::types::AskResponse,
        crate::types::QueryPlan,
        crate::types::PlanSource,
        crate::types::ExternalData,
        crate::types::WeatherReport,
        crate::types::WikiSummary,
        crate::types::ToolFailure,
        crate::types::MemoryEntry,
        crate::types::MemoryResponse,
        crate::types::ClearMemoryResponse,
        crate::types::HealthResponse,
        handlers::health::RootResponse,
    )),
    tags(
        (name = "agent", description = "Query answering"),
        (name = "memory", description = "Short-term memory"),
        (name = "system", description = "Health and status"),
    )
)]
pub struct ApiDoc;
