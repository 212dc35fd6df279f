//! Request pacing for LLM calls
//!
//! Gemini's free tier rejects bursts, so every model call goes through a
//! [`PacedClient`] which keeps a minimum gap between consecutive requests and
//! widens that gap while recent calls have been failing.
//!
//! Callers are serialised while waiting: the pacing lock is held across the
//! sleep so two concurrent requests cannot both observe an idle slot.

use crate::llm::client::LLMClient;
use crate::types::Result;
use crate::utils::toml_config::PacingConfig;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Spacing rules for model requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Gap between requests when the last calls succeeded
    pub min_interval: Duration,
    /// Gap between requests while errors are outstanding
    pub error_interval: Duration,
}

impl PacingPolicy {
    pub fn from_config(config: &PacingConfig) -> Self {
        Self {
            min_interval: Duration::from_millis(config.min_interval_ms),
            error_interval: Duration::from_millis(config.error_interval_ms),
        }
    }

    /// No spacing at all (useful for testing)
    pub fn disabled() -> Self {
        Self {
            min_interval: Duration::ZERO,
            error_interval: Duration::ZERO,
        }
    }
}

/// LLM client decorator that enforces a [`PacingPolicy`]
pub struct PacedClient {
    inner: Arc<dyn LLMClient>,
    policy: PacingPolicy,
    last_request: Mutex<Option<Instant>>,
    recent_errors: AtomicU32,
}

impl PacedClient {
    pub fn new(inner: Arc<dyn LLMClient>, policy: PacingPolicy) -> Self {
        Self {
            inner,
            policy,
            last_request: Mutex::new(None),
            recent_errors: AtomicU32::new(0),
        }
    }

    /// Number of failures not yet offset by successes
    pub fn recent_errors(&self) -> u32 {
        self.recent_errors.load(Ordering::Relaxed)
    }

    fn current_interval(&self) -> Duration {
        if self.recent_errors() > 0 {
            self.policy.error_interval
        } else {
            self.policy.min_interval
        }
    }

    async fn wait_turn(&self) {
        let mut last_request = self.last_request.lock().await;
        let interval = self.current_interval();

        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < interval {
                let wait = interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Pacing model request");
                tokio::time::sleep(wait).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    fn settle<T>(&self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => {
                let _ = self
                    .recent_errors
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                        Some(n.saturating_sub(1))
                    });
            }
            Err(_) => {
                self.recent_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }
}

#[async_trait]
impl LLMClient for PacedClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.wait_turn().await;
        let result = self.inner.generate(prompt).await;
        self.settle(result)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.wait_turn().await;
        let result = self.inner.generate_with_system(system, prompt).await;
        self.settle(result)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
