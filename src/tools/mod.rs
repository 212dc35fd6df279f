//! External lookup tools
//!
//! Each tool wraps a single REST API and is exposed through the [`Tool`]
//! trait so the reasoning agent can address it by name.
//!
//! - [`weather`](crate::tools::weather) - Current conditions from OpenWeather
//! - [`wikipedia`](crate::tools::wikipedia) - Page summaries from Wikipedia
//! - [`registry`](crate::tools::registry) - Tool registration and dispatch
//!
//! ```ignore
//! let registry = ToolRegistry::from_config(&config)?;
//! let report = registry.execute("weather", json!({"location": "Paris"})).await?;
//! ```
//!
//! [`Tool`]: crate::tools::registry::Tool

/// Tool registry for managing available tools.
pub mod registry;
/// OpenWeather current conditions.
pub mod weather;
/// Wikipedia page summaries.
pub mod wikipedia;

pub use registry::{Tool, ToolRegistry};
pub use weather::{WeatherTool, WEATHER_TOOL};
pub use wikipedia::{WikipediaTool, WIKIPEDIA_TOOL};
