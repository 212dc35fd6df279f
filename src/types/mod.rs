use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub reasoning: String,
    pub answer: String,
    pub plan: QueryPlan,
    pub sources: ExternalData,
    pub tool_failures: Vec<ToolFailure>,
    /// True when the answer was composed without the final model call
    pub degraded: bool,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemoryResponse {
    pub entries: Vec<MemoryEntry>,
    pub count: usize,
    pub capacity: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearMemoryResponse {
    pub cleared: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub llm: String,
    pub version: String,
    pub uptime_secs: u64,
}

// ============= Planning Types =============

/// Where a [`QueryPlan`] came from.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    Model,
    Keyword,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct QueryPlan {
    pub needs_weather: bool,
    pub needs_wikipedia: bool,
    pub reasoning: String,
    pub source: PlanSource,
    pub location: Option<String>,
    pub search_term: Option<String>,
}

// ============= Tool Result Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: f64,
    pub description: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub units: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct WikiSummary {
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// Facts gathered from external tools for a single query.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub struct ExternalData {
    pub weather: Option<WeatherReport>,
    pub wikipedia: Option<WikiSummary>,
}

impl ExternalData {
    pub fn is_empty(&self) -> bool {
        self.weather.is_none() && self.wikipedia.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct ToolFailure {
    pub tool: String,
    pub message: String,
}

impl ToolFailure {
    pub fn new(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

// ============= Memory Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub query: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::LLM(msg) => (axum::http::StatusCode::BAD_GATEWAY, msg),
            AppError::Tool(msg) => (axum::http::StatusCode::BAD_GATEWAY, msg),
            AppError::Configuration(msg) => {
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
