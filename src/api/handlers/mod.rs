//! API request handlers.

/// Query answering.
pub mod ask;
/// Health and banner endpoints.
pub mod health;
/// Short-term memory inspection.
pub mod memory;
