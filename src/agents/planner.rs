use crate::agents::extract::{extract_location, extract_search_term, keyword_plan};
use crate::llm::LLMClient;
use crate::types::{PlanSource, QueryPlan};
use crate::utils::toml_config::PlannerMode;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is a valid regex"));

/// Decides which external lookups a query needs.
///
/// In [`PlannerMode::Model`] the language model is asked for a JSON verdict;
/// any failure there degrades to keyword classification. Tool arguments are
/// always extracted heuristically from the query.
pub struct QueryPlanner {
    llm: Arc<dyn LLMClient>,
}

#[derive(Debug, Deserialize)]
struct ModelDecision {
    #[serde(default)]
    needs_weather: bool,
    #[serde(default)]
    needs_wikipedia: bool,
    #[serde(default)]
    reasoning: Option<String>,
}

impl QueryPlanner {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    pub async fn plan(&self, query: &str, mode: PlannerMode) -> QueryPlan {
        let plan = match mode {
            PlannerMode::Keyword => keyword_plan(query),
            PlannerMode::Model => self.model_plan(query).await,
        };
        Self::with_arguments(plan, query)
    }

    async fn model_plan(&self, query: &str) -> QueryPlan {
        let prompt = format!("User query: {}", query);

        let response = match self.llm.generate_with_system(Self::system_prompt(), &prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Query analysis failed, using keyword fallback");
                return keyword_plan(query);
            }
        };

        match Self::parse_decision(&response) {
            Some(decision) => {
                debug!(?decision, "Model query analysis");
                QueryPlan {
                    needs_weather: decision.needs_weather,
                    needs_wikipedia: decision.needs_wikipedia,
                    reasoning: decision
                        .reasoning
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or_else(|| "No specific analysis".to_string()),
                    source: PlanSource::Model,
                    location: None,
                    search_term: None,
                }
            }
            None => {
                warn!(
                    "Could not parse analysis output '{}', using keyword fallback",
                    response
                );
                keyword_plan(query)
            }
        }
    }

    /// Parse the model's JSON verdict
    ///
    /// Handles bare JSON as well as JSON wrapped in prose or code fences by
    /// taking the outermost `{...}` block.
    fn parse_decision(output: &str) -> Option<ModelDecision> {
        let candidate = JSON_OBJECT
            .find(output)
            .map(|m| m.as_str())
            .unwrap_or(output);

        serde_json::from_str(candidate.trim()).ok()
    }

    fn with_arguments(mut plan: QueryPlan, query: &str) -> QueryPlan {
        if plan.needs_weather {
            plan.location = extract_location(query);
        }
        if plan.needs_wikipedia {
            plan.search_term = extract_search_term(query);
        }
        plan
    }

    fn system_prompt() -> &'static str {
        r#"You are a tool-using agent. You MUST use external tools for factual information.

**MANDATORY RULES:**
1. ALWAYS use Wikipedia for ANY factual query including:
   - People (living or historical)
   - Places, countries, cities
   - Historical events
   - Scientific concepts
   - Inventions and discoveries
   - Books, movies, art
   - ANY factual information

2. ALWAYS use the Weather API for:
   - Current weather conditions
   - Temperature queries
   - Weather forecasts
   - Climate information for specific locations

3. ONLY answer directly for:
   - Conversational questions ("How are you?")
   - Math calculations
   - Programming code
   - Personal opinions
   - Creative writing

Do NOT answer factual questions from your own knowledge.

Respond in JSON format: {"needs_weather": boolean, "needs_wikipedia": boolean, "reasoning": string}"#
    }
}
