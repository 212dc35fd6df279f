//! LLM Provider Clients and Abstractions
//!
//! This module provides the language-model side of the agent:
//! - [`LLMClient`] - The core trait the reasoning agent depends on
//! - [`GeminiClient`] - Google Gemini over the Generative Language REST API
//! - [`PacedClient`] - Decorator spacing out requests to stay under rate limits
//!
//! # Example
//!
//! ```ignore
//! use sage::llm::{GeminiClient, PacedClient, PacingPolicy, LLMClient};
//! use std::sync::Arc;
//!
//! let gemini = Arc::new(GeminiClient::from_config(&config.gemini)?);
//! let client = PacedClient::new(gemini, PacingPolicy::from_config(&config.pacing));
//!
//! let response = client.generate("What is 2+2?").await?;
//! println!("{}", response);
//! ```

/// Core LLM client trait and generation parameters.
pub mod client;
/// Google Gemini client.
pub mod gemini;
/// Request pacing decorator.
pub mod pacer;

pub use client::{GenerationParams, LLMClient};
pub use gemini::GeminiClient;
pub use pacer::{PacedClient, PacingPolicy};
