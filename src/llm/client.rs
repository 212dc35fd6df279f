//! LLM Client abstraction
//!
//! The reasoning agent only needs two things from a language model: a plain
//! completion and a completion steered by a system instruction. Keeping that
//! behind [`LLMClient`] lets the agent run against Gemini in production and a
//! scripted mock in tests.

use crate::types::Result;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier currently in use
    fn model_name(&self) -> &str;
}

/// Sampling parameters forwarded to the provider
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: None,
            max_output_tokens: Some(1024),
        }
    }
}
