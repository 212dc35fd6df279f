//! # S.A.G.E - Search-Augmented Gemini Endpoint
//!
//! An agent backend that answers free-text queries with Google Gemini,
//! enriching them with OpenWeather and Wikipedia lookups when the query calls
//! for it, and remembering the last few exchanges.
//!
//! ## Overview
//!
//! S.A.G.E can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `sage-server` binary
//! 2. **As a library** - Import components into your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use sage::{AppState, SageConfigManager, create_app};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config_manager = Arc::new(SageConfigManager::new("sage.toml")?);
//!     let state = AppState::from_config(config_manager)?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, create_app(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Using the agent directly
//!
//! ```rust,ignore
//! use sage::{ReasoningAgent, ToolRegistry, agents::AgentSettings};
//!
//! let agent = ReasoningAgent::new(llm, Arc::new(ToolRegistry::from_config(&config)?));
//! let outcome = agent.process("What's the weather in Paris?", &AgentSettings::default(), &[]).await?;
//! println!("{}", outcome.answer);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `swagger-ui` | Interactive OpenAPI docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`agents`] - Query planning and the reasoning agent
//! - [`api`] - REST API handlers and routes
//! - [`llm`] - Gemini client and request pacing
//! - [`memory`] - Bounded short-term memory
//! - [`tools`] - Weather and Wikipedia lookups
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration with hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Query planning and the reasoning agent.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Short-term memory of recent exchanges.
pub mod memory;
/// External lookup tools (weather, Wikipedia).
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use agents::ReasoningAgent;
pub use llm::{GeminiClient, LLMClient, PacedClient, PacingPolicy};
pub use memory::ShortTermMemory;
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Result};
pub use utils::toml_config::{SageConfig, SageConfigManager};

use axum::{extract::DefaultBodyLimit, Router};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based configuration with hot-reload support
    pub config_manager: Arc<SageConfigManager>,
    /// Agent answering `/ask`
    pub agent: Arc<ReasoningAgent>,
    /// Recent exchanges
    pub memory: Arc<ShortTermMemory>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config_manager: Arc<SageConfigManager>,
        agent: Arc<ReasoningAgent>,
        memory: Arc<ShortTermMemory>,
    ) -> Self {
        Self {
            config_manager,
            agent,
            memory,
            started_at: Instant::now(),
        }
    }

    /// Build the production state: paced Gemini client, configured tools
    /// and a memory buffer sized from `[memory]`.
    pub fn from_config(config_manager: Arc<SageConfigManager>) -> Result<Self> {
        let config = config_manager.config();

        let gemini: Arc<dyn LLMClient> = Arc::new(GeminiClient::from_config(&config.gemini)?);
        let llm: Arc<dyn LLMClient> = Arc::new(PacedClient::new(
            gemini,
            PacingPolicy::from_config(&config.pacing),
        ));
        let tools = Arc::new(ToolRegistry::from_config(&config)?);

        let agent = Arc::new(ReasoningAgent::new(llm, tools));
        let memory = Arc::new(ShortTermMemory::new(config.memory.capacity));

        Ok(Self::new(config_manager, agent, memory))
    }
}

/// Assemble the HTTP application: routes, CORS, tracing and body limit
pub fn create_app(state: AppState) -> Router {
    let max_body_bytes = state.config_manager.config().server.max_body_bytes;

    let router = api::routes::create_router();

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
