//! Current conditions from the OpenWeather API.

use crate::tools::registry::Tool;
use crate::types::{AppError, Result, WeatherReport};
use crate::utils::toml_config::WeatherConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Registry name of the weather tool.
pub const WEATHER_TOOL: &str = "weather";

pub struct WeatherTool {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    units: String,
}

impl WeatherTool {
    /// Create a weather tool. A missing `api_key` is allowed; lookups then
    /// fail with a tool error instead of calling the API.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        units: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
            units: units.into(),
        })
    }

    pub fn from_config(config: &WeatherConfig, api_key: Option<String>) -> Result<Self> {
        Self::new(
            api_key,
            config.base_url.clone(),
            config.units.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Fetch current conditions for a city name
    pub async fn current(&self, location: &str) -> Result<WeatherReport> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Tool("OpenWeather API key not configured".to_string()))?;

        debug!(location = %location, "Fetching weather");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", location),
                ("appid", api_key),
                ("units", self.units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Tool(format!("Weather API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Tool(format!(
                "Weather API error: {}",
                status.as_u16()
            )));
        }

        let data: OpenWeatherResponse = response
            .json()
            .await
            .map_err(|e| AppError::Tool(format!("Weather API call failed: {}", e)))?;

        Ok(WeatherReport {
            location: data.name.unwrap_or_else(|| location.to_string()),
            temperature: data.main.temp,
            description: data
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_default(),
            humidity: data.main.humidity,
            wind_speed: data.wind.map(|w| w.speed).unwrap_or_default(),
            units: self.units.clone(),
        })
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let location = args["location"]
            .as_str()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or_else(|| AppError::InvalidInput("location is required".to_string()))?;

        let report = self.current(location).await?;
        serde_json::to_value(report).map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    name: Option<String>,
    main: MainBlock,
    #[serde(default)]
    weather: Vec<Condition>,
    wind: Option<Wind>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(api_key: Option<&str>) -> WeatherTool {
        WeatherTool::new(
            api_key.map(String::from),
            "http://127.0.0.1:1/weather",
            "metric",
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_key_is_tool_error() {
        let err = tool(None).current("Paris").await.unwrap_err();
        assert!(matches!(err, AppError::Tool(ref m) if m == "OpenWeather API key not configured"));
    }

    #[tokio::test]
    async fn test_execute_requires_location() {
        let result = tool(Some("k")).execute(json!({ "location": "  " })).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_openweather_payload() {
        let data: OpenWeatherResponse = serde_json::from_value(json!({
            "name": "Paris",
            "main": { "temp": 18.5, "humidity": 60 },
            "weather": [{ "description": "light rain" }],
            "wind": { "speed": 4.1 }
        }))
        .unwrap();

        assert_eq!(data.name.as_deref(), Some("Paris"));
        assert_eq!(data.main.humidity, 60.0);
        assert_eq!(data.weather[0].description, "light rain");
    }
}
