use crate::{
    AppState,
    agents::AgentSettings,
    types::{AppError, AskRequest, AskResponse, Result},
};
use axum::{Json, extract::State};
use tracing::info;

/// Answer a query
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer with reasoning and sources", body = AskResponse),
        (status = 400, description = "Empty or oversized query"),
        (status = 502, description = "Language model unavailable")
    ),
    tag = "agent"
)]
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let config = state.config_manager.config();
    let query = validate_query(&payload.query, config.agent.max_query_chars)?;

    let settings = AgentSettings::from_config(&config);
    let history = if settings.history_window > 0 {
        state.memory.recent(Some(settings.history_window))
    } else {
        Vec::new()
    };

    let outcome = state.agent.process(query, &settings, &history).await?;
    state.memory.record(query, &outcome.answer);

    info!(
        degraded = outcome.degraded,
        tool_failures = outcome.tool_failures.len(),
        "Query answered"
    );

    Ok(Json(AskResponse {
        reasoning: outcome.reasoning,
        answer: outcome.answer,
        plan: outcome.plan,
        sources: outcome.sources,
        tool_failures: outcome.tool_failures,
        degraded: outcome.degraded,
        model: outcome.model,
    }))
}

/// Trimmed query, or `InvalidInput` when blank or longer than `max_chars`
pub fn validate_query(query: &str, max_chars: usize) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("Query must not be empty".to_string()));
    }

    let len = query.chars().count();
    if len > max_chars {
        return Err(AppError::InvalidInput(format!(
            "Query is too long ({} characters, maximum {})",
            len, max_chars
        )));
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  hello ", 10).unwrap(), "hello");
        assert!(matches!(validate_query(" \n\t", 10), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_query("abcdef", 5), Err(AppError::InvalidInput(_))));
        assert!(validate_query("ééééé", 5).is_ok());
    }
}
