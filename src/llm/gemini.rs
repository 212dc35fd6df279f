//! Google Gemini client implementation
//!
//! Talks to the Generative Language REST API (`generateContent`). The client
//! holds an ordered chain of model names: when the API answers `404` for a
//! model, the next one in the chain is tried and remembered for later calls.
//!
//! # Example
//!
//! ```rust,ignore
//! use sage::llm::{GeminiClient, LLMClient};
//!
//! let client = GeminiClient::from_config(&config.gemini)?;
//! let text = client.generate_with_system("Be terse.", "What is 2+2?").await?;
//! ```

use crate::llm::client::{GenerationParams, LLMClient};
use crate::types::{AppError, Result};
use crate::utils::toml_config::GeminiConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Generative Language API base URL
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client with a model fallback chain
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    models: Vec<String>,
    active: AtomicUsize,
    params: GenerationParams,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Arguments
    ///
    /// * `api_key` - Google AI Studio API key
    /// * `api_base` - API base URL, usually [`DEFAULT_API_BASE`]
    /// * `models` - Model chain, primary first
    /// * `params` - Sampling parameters
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_key: String,
        api_base: String,
        models: Vec<String>,
        params: GenerationParams,
        timeout: Duration,
    ) -> Result<Self> {
        if models.is_empty() {
            return Err(AppError::Configuration(
                "At least one Gemini model must be configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            models,
            active: AtomicUsize::new(0),
            params,
        })
    }

    /// Create a client from the `[gemini]` configuration section.
    ///
    /// The API key is read from the environment variable named by
    /// `api_key_env`.
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            AppError::Configuration(format!(
                "Environment variable '{}' is not set",
                config.api_key_env
            ))
        })?;

        Self::new(
            api_key,
            config.api_base.clone(),
            config.model_chain(),
            GenerationParams {
                temperature: config.temperature,
                max_output_tokens: Some(config.max_output_tokens),
            },
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build_request_body(&self, system: Option<&str>, prompt: &str) -> Value {
        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = self.params.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = self.params.max_output_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }

        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": generation_config,
        });

        if let Some(system) = system {
            body["systemInstruction"] = json!({
                "parts": [{ "text": system }]
            });
        }

        body
    }

    async fn send(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let body = self.build_request_body(system, prompt);
        let start = self.active.load(Ordering::Relaxed);

        for idx in start..self.models.len() {
            let model = &self.models[idx];
            let url = format!("{}/models/{}:generateContent", self.api_base, model);

            debug!(model = %model, "Sending request to Gemini");

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| AppError::LLM(format!("Failed to reach Gemini: {}", e)))?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND && idx + 1 < self.models.len() {
                warn!(
                    model = %model,
                    next = %self.models[idx + 1],
                    "Gemini model unavailable, falling back"
                );
                self.active.store(idx + 1, Ordering::Relaxed);
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(AppError::LLM(format!(
                    "Gemini API error (status {}): {}",
                    status, error_text
                )));
            }

            let parsed: GenerateContentResponse = response
                .json()
                .await
                .map_err(|e| AppError::LLM(format!("Failed to parse Gemini response: {}", e)))?;

            return parsed.into_text();
        }

        Err(AppError::LLM("No Gemini model available".to_string()))
    }

    /// List the Gemini models visible to this API key
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to reach Gemini: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::LLM(format!(
                "Gemini model listing failed (status {})",
                status
            )));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse model list: {}", e)))?;

        Ok(list
            .models
            .into_iter()
            .map(|m| m.name)
            .filter(|name| name.to_lowercase().contains("gemini"))
            .collect())
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.send(None, prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.send(Some(system), prompt).await
    }

    fn model_name(&self) -> &str {
        let idx = self.active.load(Ordering::Relaxed).min(self.models.len() - 1);
        &self.models[idx]
    }
}

// Gemini API response types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AppError::LLM(format!(
                "Gemini blocked the prompt: {}",
                reason
            )));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLM("No candidates in Gemini response".to_string()))?;

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::LLM(format!(
                "Gemini returned an empty response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}
