//! TOML-based configuration for S.A.G.E
//!
//! This module provides declarative configuration for the Gemini client,
//! request pacing, external tools, memory and agent behaviour via a TOML file
//! (`sage.toml`). Secrets are never stored in the file: each section names the
//! environment variable that holds its key.
//!
//! # Hot Reloading
//!
//! Configuration changes are automatically detected and applied at runtime.
//! Use `SageConfigManager` for thread-safe access to the current configuration.
//! Per-request agent settings follow reloads; HTTP clients and the memory
//! capacity are fixed when the server starts.

use crate::llm::gemini::DEFAULT_API_BASE;
use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from sage.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SageConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub pacing: PacingConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub wikipedia: WikipediaConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Upper bound on request body size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ============= Gemini Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Environment variable containing the API key
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_gemini_base")]
    pub api_base: String,

    /// Primary model
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Models tried in order when the primary is unavailable
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,

    /// Optional sampling temperature
    pub temperature: Option<f32>,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_fallback_models() -> Vec<String> {
    vec![
        "gemini-1.5-flash".to_string(),
        "gemini-1.5-pro".to_string(),
        "gemini-1.0-pro".to_string(),
    ]
}

fn default_max_output_tokens() -> u32 {
    1024
}

fn default_llm_timeout() -> u64 {
    30
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_key_env(),
            api_base: default_gemini_base(),
            model: default_gemini_model(),
            fallback_models: default_fallback_models(),
            temperature: None,
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl GeminiConfig {
    /// Primary model followed by the fallbacks, blanks and duplicates removed
    pub fn model_chain(&self) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        for model in std::iter::once(&self.model).chain(self.fallback_models.iter()) {
            let model = model.trim();
            if !model.is_empty() && !chain.iter().any(|m| m == model) {
                chain.push(model.to_string());
            }
        }
        chain
    }
}

// ============= Pacing Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Interval used while recent model calls have failed
    #[serde(default = "default_error_interval_ms")]
    pub error_interval_ms: u64,
}

fn default_min_interval_ms() -> u64 {
    5000
}

fn default_error_interval_ms() -> u64 {
    10000
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            error_interval_ms: default_error_interval_ms(),
        }
    }
}

// ============= Tool Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Environment variable containing the OpenWeather API key
    #[serde(default = "default_weather_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_weather_url")]
    pub base_url: String,

    #[serde(default = "default_units")]
    pub units: String,

    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_weather_key_env() -> String {
    "OPENWEATHER_API_KEY".to_string()
}

fn default_weather_url() -> String {
    "http://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_tool_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: default_weather_key_env(),
            base_url: default_weather_url(),
            units: default_units(),
            timeout_secs: default_tool_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// REST summary endpoint; the page title is appended
    #[serde(default = "default_wikipedia_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

fn default_wikipedia_url() -> String {
    "https://en.wikipedia.org/api/rest_v1/page/summary/".to_string()
}

fn default_user_agent() -> String {
    format!(
        "sage-server/{} (https://github.com/dirmacs/sage)",
        env!("CARGO_PKG_VERSION")
    )
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_wikipedia_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_tool_timeout(),
        }
    }
}

// ============= Memory Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of remembered exchanges
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Whether recent exchanges are shown to the model
    #[serde(default)]
    pub include_in_prompt: bool,

    /// Number of exchanges included when `include_in_prompt` is set
    #[serde(default = "default_prompt_window")]
    pub prompt_window: usize,
}

fn default_capacity() -> usize {
    5
}

fn default_prompt_window() -> usize {
    3
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            include_in_prompt: false,
            prompt_window: default_prompt_window(),
        }
    }
}

// ============= Planner & Agent Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannerMode {
    /// Ask the model which tools to use, keyword fallback on failure
    #[default]
    Model,
    /// Keyword heuristics only, no model call
    Keyword,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub mode: PlannerMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Compose an answer from fetched facts when the final model call fails
    #[serde(default)]
    pub degraded_answers: bool,

    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,
}

fn default_max_query_chars() -> usize {
    4000
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            degraded_answers: false,
            max_query_chars: default_max_query_chars(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    MissingToolKey,
    AllToolsDisabled,
    PacingInverted,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl SageConfig {
    /// Read and parse a TOML file without validating it
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_env_var(&self.gemini.api_key_env)?;

        if self.gemini.model_chain().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.model must name at least one model".to_string(),
            ));
        }

        if self.memory.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "memory.capacity must be greater than zero".to_string(),
            ));
        }

        if self.memory.prompt_window > self.memory.capacity {
            return Err(ConfigError::ValidationError(format!(
                "memory.prompt_window ({}) cannot exceed memory.capacity ({})",
                self.memory.prompt_window, self.memory.capacity
            )));
        }

        if self.agent.max_query_chars == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_query_chars must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate configuration with warnings for suspicious settings
    ///
    /// Returns Ok with warnings, or Err if validation fails
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();

        if self.weather.enabled && self.resolve_env(&self.weather.api_key_env).is_none() {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::MissingToolKey,
                message: format!(
                    "Weather tool is enabled but '{}' is not set; weather lookups will fail",
                    self.weather.api_key_env
                ),
            });
        }

        if !self.weather.enabled && !self.wikipedia.enabled {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::AllToolsDisabled,
                message: "Both weather and wikipedia tools are disabled".to_string(),
            });
        }

        if self.pacing.error_interval_ms < self.pacing.min_interval_ms {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::PacingInverted,
                message: format!(
                    "pacing.error_interval_ms ({}) is shorter than pacing.min_interval_ms ({})",
                    self.pacing.error_interval_ms, self.pacing.min_interval_ms
                ),
            });
        }

        Ok(warnings)
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the OpenWeather API key from the environment, if set
    pub fn weather_api_key(&self) -> Option<String> {
        self.resolve_env(&self.weather.api_key_env)
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct SageConfigManager {
    config: Arc<ArcSwap<SageConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl SageConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Convert to absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = SageConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: SageConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("test-config.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<SageConfig> {
        self.config.load_full()
    }

    /// Path of the watched configuration file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = SageConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = self.config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        // Send reload signal (debounced in the receiver)
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the config file's parent directory
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let debounce_duration = Duration::from_millis(500);
            let mut last_reload = std::time::Instant::now() - debounce_duration;

            while rx.recv().await.is_some() {
                if last_reload.elapsed() < debounce_duration {
                    continue;
                }

                // Wait a bit for file write to complete
                tokio::time::sleep(Duration::from_millis(100)).await;

                match SageConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = std::time::Instant::now();
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

impl Clone for SageConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
            watcher: RwLock::new(None), // Watcher is not cloned
        }
    }
}
