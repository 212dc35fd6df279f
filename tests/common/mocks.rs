//! Mock implementations for testing.
//!
//! A scripted LLM client that can be shared across test files. Each call
//! pops the next scripted reply; once the script is exhausted the fallback
//! reply is used. Every `(system, prompt)` pair is recorded for assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sage::llm::LLMClient;
use sage::types::{AppError, Result};
use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    Fail,
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }
}

/// Mock LLM client with scripted responses.
///
/// ```ignore
/// // Always answer the same thing
/// let client = MockLLMClient::new("REASONING: r\nANSWER: a");
///
/// // Planner reply, then a failing final call
/// let client = MockLLMClient::scripted(vec![Reply::text("{...}"), Reply::Fail]);
///
/// // Always fail
/// let client = MockLLMClient::failing();
/// ```
pub struct MockLLMClient {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLLMClient {
    /// Create a new mock client that always returns the given response.
    pub fn new(response: &str) -> Self {
        Self::scripted_with_fallback(vec![], Reply::text(response))
    }

    /// Replies in order, failing once the script runs out.
    pub fn scripted(replies: Vec<Reply>) -> Self {
        Self::scripted_with_fallback(replies, Reply::Fail)
    }

    pub fn scripted_with_fallback(replies: Vec<Reply>, fallback: Reply) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self::scripted(vec![])
    }

    /// Recorded `(system, prompt)` pairs, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    fn next_reply(&self) -> Reply {
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .push((system.to_string(), prompt.to_string()));

        match self.next_reply() {
            Reply::Text(text) => Ok(text),
            Reply::Fail => Err(AppError::LLM("Mock LLM failure".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
