//! Page summaries from the Wikipedia REST API.

use crate::tools::registry::Tool;
use crate::types::{AppError, Result, WikiSummary};
use crate::utils::toml_config::WikipediaConfig;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Registry name of the Wikipedia tool.
pub const WIKIPEDIA_TOOL: &str = "wikipedia";

const NO_SUMMARY: &str = "No summary available.";

pub struct WikipediaTool {
    client: reqwest::Client,
    base_url: Url,
}

impl WikipediaTool {
    /// Create a Wikipedia tool against a `.../page/summary/` base URL
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Configuration(format!("Invalid Wikipedia base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "Wikipedia base URL '{}' cannot carry a path",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &WikipediaConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Summary URL for a search term; spaces become underscores
    pub fn page_url(&self, term: &str) -> Url {
        let title = term.trim().replace(' ', "_");
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&title);
        }
        url
    }

    /// Fetch the summary of the page best matching `term`
    pub async fn summary(&self, term: &str) -> Result<WikiSummary> {
        let url = self.page_url(term);
        debug!(url = %url, "Fetching Wikipedia summary");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Tool(format!("Wikipedia API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Tool(format!(
                "Wikipedia API error: {}",
                status.as_u16()
            )));
        }

        let page: PageSummary = response
            .json()
            .await
            .map_err(|e| AppError::Tool(format!("Wikipedia API call failed: {}", e)))?;

        Ok(page.into_summary(term))
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        WIKIPEDIA_TOOL
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let term = args["query"]
            .as_str()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::InvalidInput("query is required".to_string()))?;

        let summary = self.summary(term).await?;
        serde_json::to_value(summary).map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<DesktopUrls>,
}

#[derive(Debug, Deserialize)]
struct DesktopUrls {
    page: Option<String>,
}

impl PageSummary {
    fn into_summary(self, term: &str) -> WikiSummary {
        WikiSummary {
            title: self.title.unwrap_or_else(|| term.to_string()),
            summary: self
                .extract
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| NO_SUMMARY.to_string()),
            url: self
                .content_urls
                .and_then(|c| c.desktop)
                .and_then(|d| d.page)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(base: &str) -> WikipediaTool {
        WikipediaTool::new(base, "sage-test/0.1", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_page_url_replaces_spaces() {
        let tool = tool("https://en.wikipedia.org/api/rest_v1/page/summary/");
        assert_eq!(
            tool.page_url("Albert Einstein").as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/Albert_Einstein"
        );
    }

    #[test]
    fn test_page_url_without_trailing_slash() {
        let tool = tool("http://localhost:8080/page/summary");
        assert_eq!(
            tool.page_url(" Rust ").as_str(),
            "http://localhost:8080/page/summary/Rust"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = WikipediaTool::new("not a url", "ua", Duration::from_secs(1));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_summary_defaults() {
        let page: PageSummary = serde_json::from_value(json!({})).unwrap();
        let summary = page.into_summary("Rust");

        assert_eq!(summary.title, "Rust");
        assert_eq!(summary.summary, NO_SUMMARY);
        assert_eq!(summary.url, "");
    }

    #[test]
    fn test_summary_maps_fields() {
        let page: PageSummary = serde_json::from_value(json!({
            "title": "Rust (programming language)",
            "extract": "Rust is a systems language.",
            "content_urls": { "desktop": { "page": "https://en.wikipedia.org/wiki/Rust" } }
        }))
        .unwrap();
        let summary = page.into_summary("rust");

        assert_eq!(summary.title, "Rust (programming language)");
        assert_eq!(summary.url, "https://en.wikipedia.org/wiki/Rust");
    }
}
