//! The reasoning agent
//!
//! One [`ReasoningAgent::process`] call runs the whole exchange for a query:
//!
//! 1. plan which lookups are needed ([`QueryPlanner`])
//! 2. run the weather and Wikipedia lookups concurrently through the
//!    [`ToolRegistry`]
//! 3. ask the model for a `REASONING:` / `ANSWER:` reply grounded in the
//!    fetched facts
//! 4. split the reply into its two parts
//!
//! Lookup failures never abort the exchange; they are collected as
//! [`ToolFailure`]s. A failed final model call is an error unless degraded
//! answers are enabled, in which case an answer is composed from the facts.

use crate::agents::planner::QueryPlanner;
use crate::llm::LLMClient;
use crate::memory::format_history_for_prompt;
use crate::tools::{ToolRegistry, WEATHER_TOOL, WIKIPEDIA_TOOL};
use crate::types::{
    AppError, ExternalData, MemoryEntry, QueryPlan, Result, ToolFailure, WeatherReport,
    WikiSummary,
};
use crate::utils::toml_config::{PlannerMode, SageConfig};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

static REASONING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)REASONING:\s*(.*?)(?:ANSWER:|$)").expect("reasoning marker is a valid regex")
});
static ANSWER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ANSWER:").expect("answer marker is a valid regex"));
static REASONING_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)REASONING:").expect("reasoning label is a valid regex"));

const GENERIC_REASONING: &str = "I processed your query using available tools and knowledge.";
const NO_EXTERNAL_DATA: &str = "No external data available";

const FINAL_SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant. Generate a response that includes:
1. Your reasoning process (why you used certain tools or answered directly)
2. A clear, helpful answer to the user's query
3. Integration of any external data you gathered

Format your response exactly as follows:

REASONING: [Your reasoning here]
ANSWER: [Your final answer here]

Be concise but informative in your reasoning. If you used external APIs, mention what data you fetched."#;

/// Per-request behaviour, re-read from configuration on every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub planner_mode: PlannerMode,
    pub degraded_answers: bool,
    /// Number of past exchanges shown to the model (0 disables)
    pub history_window: usize,
}

impl AgentSettings {
    pub fn from_config(config: &SageConfig) -> Self {
        Self {
            planner_mode: config.planner.mode,
            degraded_answers: config.agent.degraded_answers,
            history_window: if config.memory.include_in_prompt {
                config.memory.prompt_window
            } else {
                0
            },
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&SageConfig::default())
    }
}

/// Everything produced for one query
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub reasoning: String,
    pub answer: String,
    pub plan: QueryPlan,
    pub sources: ExternalData,
    pub tool_failures: Vec<ToolFailure>,
    pub degraded: bool,
    pub model: String,
}

pub struct ReasoningAgent {
    llm: Arc<dyn LLMClient>,
    planner: QueryPlanner,
    tools: Arc<ToolRegistry>,
}

impl ReasoningAgent {
    pub fn new(llm: Arc<dyn LLMClient>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            planner: QueryPlanner::new(Arc::clone(&llm)),
            llm,
            tools,
        }
    }

    /// Model currently answering requests
    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the full exchange for a query.
    ///
    /// `history` is the recent conversation, most recent first; only the
    /// first `settings.history_window` entries are used.
    pub async fn process(
        &self,
        query: &str,
        settings: &AgentSettings,
        history: &[MemoryEntry],
    ) -> Result<AgentOutcome> {
        let plan = self.planner.plan(query, settings.planner_mode).await;
        info!(
            needs_weather = plan.needs_weather,
            needs_wikipedia = plan.needs_wikipedia,
            source = ?plan.source,
            "Query plan ready"
        );

        let (sources, tool_failures) = self.execute_plan(&plan).await;
        for failure in &tool_failures {
            warn!(tool = %failure.tool, "Lookup failed: {}", failure.message);
        }

        let window = history.len().min(settings.history_window);
        let prompt = build_final_prompt(query, &plan, &sources, &history[..window]);

        match self.llm.generate_with_system(FINAL_SYSTEM_PROMPT, &prompt).await {
            Ok(response) => {
                debug!(response = %response, "Raw model response");
                let (reasoning, answer) = parse_response(&response);
                Ok(AgentOutcome {
                    reasoning,
                    answer,
                    plan,
                    sources,
                    tool_failures,
                    degraded: false,
                    model: self.model_name().to_string(),
                })
            }
            Err(e) if settings.degraded_answers => {
                warn!(error = %e, "Final response failed, composing degraded answer");
                let action = if sources.is_empty() {
                    "answer directly"
                } else {
                    "use external APIs"
                };
                Ok(AgentOutcome {
                    reasoning: format!(
                        "I analyzed your query and decided to {}. Error during response generation: {}",
                        action, e
                    ),
                    answer: fallback_answer(&sources),
                    plan,
                    sources,
                    tool_failures,
                    degraded: true,
                    model: self.model_name().to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Run the lookups the plan asks for, concurrently
    pub async fn execute_plan(&self, plan: &QueryPlan) -> (ExternalData, Vec<ToolFailure>) {
        let weather = async {
            if !plan.needs_weather {
                return None;
            }
            Some(match &plan.location {
                Some(location) => {
                    self.run_tool::<WeatherReport>(WEATHER_TOOL, json!({ "location": location }))
                        .await
                }
                None => Err(ToolFailure::new(
                    WEATHER_TOOL,
                    "Could not extract location from query",
                )),
            })
        };

        let wikipedia = async {
            if !plan.needs_wikipedia {
                return None;
            }
            Some(match &plan.search_term {
                Some(term) => {
                    self.run_tool::<WikiSummary>(WIKIPEDIA_TOOL, json!({ "query": term }))
                        .await
                }
                None => Err(ToolFailure::new(
                    WIKIPEDIA_TOOL,
                    "Could not extract search term from query",
                )),
            })
        };

        let (weather, wikipedia) = tokio::join!(weather, wikipedia);

        let mut sources = ExternalData::default();
        let mut failures = Vec::new();

        match weather {
            Some(Ok(report)) => sources.weather = Some(report),
            Some(Err(failure)) => failures.push(failure),
            None => {}
        }
        match wikipedia {
            Some(Ok(summary)) => sources.wikipedia = Some(summary),
            Some(Err(failure)) => failures.push(failure),
            None => {}
        }

        (sources, failures)
    }

    async fn run_tool<T: DeserializeOwned>(
        &self,
        name: &str,
        args: Value,
    ) -> std::result::Result<T, ToolFailure> {
        if !self.tools.has_tool(name) {
            return Err(ToolFailure::new(
                name,
                format!("tool '{}' is disabled", name),
            ));
        }

        let value = self
            .tools
            .execute(name, args)
            .await
            .map_err(|e| ToolFailure::new(name, tool_message(e)))?;

        serde_json::from_value(value)
            .map_err(|e| ToolFailure::new(name, format!("Unexpected tool output: {}", e)))
    }
}

fn tool_message(error: AppError) -> String {
    match error {
        AppError::Tool(msg) | AppError::InvalidInput(msg) | AppError::NotFound(msg) => msg,
        other => other.to_string(),
    }
}

fn temperature_symbol(units: &str) -> &'static str {
    match units {
        "imperial" => "°F",
        "standard" => "K",
        _ => "°C",
    }
}

fn build_final_prompt(
    query: &str,
    plan: &QueryPlan,
    sources: &ExternalData,
    history: &[MemoryEntry],
) -> String {
    let mut context_parts = Vec::new();
    if let Some(weather) = &sources.weather {
        context_parts.push(format!(
            "Weather data: {}: {}, {}{}, humidity {}%, wind speed {}",
            weather.location,
            weather.description,
            weather.temperature,
            temperature_symbol(&weather.units),
            weather.humidity,
            weather.wind_speed
        ));
    }
    if let Some(wiki) = &sources.wikipedia {
        context_parts.push(format!(
            "Wikipedia summary ({}): {}",
            wiki.title, wiki.summary
        ));
    }

    let context = if context_parts.is_empty() {
        NO_EXTERNAL_DATA.to_string()
    } else {
        context_parts.join("\n")
    };

    let mut prompt = String::new();
    if !history.is_empty() {
        prompt.push_str("Recent conversation:\n");
        prompt.push_str(&format_history_for_prompt(history));
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!(
        "User Query: {}\n\nMy Analysis: {}\n\nExternal Data: {}\n\nPlease provide your reasoning and final answer in the specified format.",
        query, plan.reasoning, context
    ));
    prompt
}

/// Split a model reply into `(reasoning, answer)`.
///
/// Prefers explicit `REASONING:` / `ANSWER:` markers (any case). Without a
/// reasoning marker, text before `ANSWER:` is the reasoning. Without either,
/// the first two sentences are the reasoning and the rest the answer.
pub fn parse_response(response: &str) -> (String, String) {
    let response = response.trim();

    if let Some(answer_at) = ANSWER_MARKER.find(response) {
        let answer = response[answer_at.end()..].trim().to_string();

        let reasoning = REASONING_MARKER
            .captures(response)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| {
                let before = &response[..answer_at.start()];
                REASONING_LABEL.replace_all(before, "").trim().to_string()
            });

        if !answer.is_empty() {
            let reasoning = if reasoning.is_empty() {
                GENERIC_REASONING.to_string()
            } else {
                reasoning
            };
            return (reasoning, answer);
        }
    }

    let sentences: Vec<&str> = response
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.len() > 2 {
        let reasoning = format!("{}.", sentences[..2].join(". "));
        let mut answer = sentences[2..].join(". ");
        if !answer.ends_with(['?', '!']) {
            answer.push('.');
        }
        (reasoning, answer)
    } else {
        (GENERIC_REASONING.to_string(), response.to_string())
    }
}

/// Answer composed from fetched facts when the model is unavailable
pub fn fallback_answer(sources: &ExternalData) -> String {
    if let Some(weather) = &sources.weather {
        return format!(
            "The weather in {} is {} with a temperature of {}{}.",
            weather.location,
            weather.description,
            weather.temperature,
            temperature_symbol(&weather.units)
        );
    }

    if let Some(wiki) = &sources.wikipedia {
        return format!("According to Wikipedia: {}", wiki.summary);
    }

    "I encountered an error while processing your query, but I tried my best to gather relevant information for you.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlanSource;

    fn weather() -> WeatherReport {
        WeatherReport {
            location: "Paris".to_string(),
            temperature: 18.5,
            description: "light rain".to_string(),
            humidity: 70.0,
            wind_speed: 3.2,
            units: "metric".to_string(),
        }
    }

    fn plan() -> QueryPlan {
        QueryPlan {
            needs_weather: false,
            needs_wikipedia: false,
            reasoning: "Conversational".to_string(),
            source: PlanSource::Model,
            location: None,
            search_term: None,
        }
    }

    #[test]
    fn test_parse_response_with_markers() {
        let (reasoning, answer) =
            parse_response("REASONING: I used the weather API.\nANSWER: It is raining.");
        assert_eq!(reasoning, "I used the weather API.");
        assert_eq!(answer, "It is raining.");
    }

    #[test]
    fn test_parse_response_markers_any_case() {
        let (reasoning, answer) = parse_response("Reasoning: direct\nAnswer: 4");
        assert_eq!(reasoning, "direct");
        assert_eq!(answer, "4");
    }

    #[test]
    fn test_parse_response_answer_only_marker() {
        let (reasoning, answer) = parse_response("Thinking about it.\nANSWER: 42");
        assert_eq!(reasoning, "Thinking about it.");
        assert_eq!(answer, "42");
    }

    #[test]
    fn test_parse_response_sentence_split() {
        let (reasoning, answer) =
            parse_response("I know this. No tools needed. Two plus two is four.");
        assert_eq!(reasoning, "I know this. No tools needed.");
        assert_eq!(answer, "Two plus two is four.");

        let (_, answer) = parse_response("I know this. No tools needed. Is there anything else?");
        assert_eq!(answer, "Is there anything else?");

        let (reasoning, answer) = parse_response("Checked. Done. Paris is lovely!");
        assert_eq!(reasoning, "Checked. Done.");
        assert_eq!(answer, "Paris is lovely!");
    }

    #[test]
    fn test_markers_compile() {
        assert!(ANSWER_MARKER.is_match("answer: yes"));
        assert!(REASONING_LABEL.is_match("Reasoning: because"));
        assert!(REASONING_MARKER.is_match("REASONING: x ANSWER: y"));
    }

    #[test]
    fn test_parse_response_single_sentence() {
        let (reasoning, answer) = parse_response("Hello there!");
        assert_eq!(reasoning, GENERIC_REASONING);
        assert_eq!(answer, "Hello there!");
    }

    #[test]
    fn test_fallback_answer_prefers_weather() {
        let sources = ExternalData {
            weather: Some(weather()),
            wikipedia: Some(WikiSummary {
                title: "Paris".to_string(),
                summary: "Capital of France.".to_string(),
                url: String::new(),
            }),
        };
        assert_eq!(
            fallback_answer(&sources),
            "The weather in Paris is light rain with a temperature of 18.5°C."
        );
    }

    #[test]
    fn test_fallback_answer_wikipedia_and_generic() {
        let sources = ExternalData {
            weather: None,
            wikipedia: Some(WikiSummary {
                title: "Rust".to_string(),
                summary: "A language.".to_string(),
                url: String::new(),
            }),
        };
        assert_eq!(fallback_answer(&sources), "According to Wikipedia: A language.");
        assert!(fallback_answer(&ExternalData::default()).starts_with("I encountered an error"));
    }

    #[test]
    fn test_final_prompt_without_data() {
        let prompt = build_final_prompt("hi", &plan(), &ExternalData::default(), &[]);
        assert!(prompt.contains("External Data: No external data available"));
        assert!(prompt.contains("My Analysis: Conversational"));
        assert!(!prompt.contains("Recent conversation"));
    }

    #[test]
    fn test_final_prompt_with_weather_and_history() {
        let sources = ExternalData {
            weather: Some(weather()),
            wikipedia: None,
        };
        let history = vec![MemoryEntry {
            id: uuid::Uuid::new_v4(),
            query: "earlier question".to_string(),
            answer: "earlier answer".to_string(),
            created_at: chrono::Utc::now(),
        }];
        let prompt = build_final_prompt("weather?", &plan(), &sources, &history);

        assert!(prompt.starts_with("Recent conversation:"));
        assert!(prompt.contains("earlier question"));
        assert!(prompt.contains("Paris: light rain, 18.5°C"));
    }

    #[test]
    fn test_settings_history_window_follows_flag() {
        let mut config = SageConfig::default();
        assert_eq!(AgentSettings::from_config(&config).history_window, 0);

        config.memory.include_in_prompt = true;
        config.memory.prompt_window = 2;
        assert_eq!(AgentSettings::from_config(&config).history_window, 2);
    }
}
