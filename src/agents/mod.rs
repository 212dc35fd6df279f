//! Query planning and reasoning
//!
//! - [`extract`] - Keyword classification and argument extraction
//! - [`planner`] - Model-backed decision step with keyword fallback
//! - [`reasoning`] - The end-to-end agent behind `POST /ask`

pub mod extract;
pub mod planner;
pub mod reasoning;

pub use planner::QueryPlanner;
pub use reasoning::{AgentOutcome, AgentSettings, ReasoningAgent};
