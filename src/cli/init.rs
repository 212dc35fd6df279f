//! Init command implementation
//!
//! Scaffolds a new S.A.G.E project: `sage.toml`, `.env.example` and a
//! `.gitignore` that keeps `.env` out of version control.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (sage.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing S.A.G.E Project");

    let base_path = &config.path;

    let config_path = base_path.join("sage.toml");
    if config_path.exists() && !config.force {
        output.warning("sage.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    output.subheader("Creating configuration files");

    let toml_content = generate_sage_toml(&config);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create sage.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "sage.toml");

    let env_example_path = base_path.join(".env.example");
    if env_example_path.exists() && !config.force {
        output.skipped(".env.example", "already exists");
    } else if let Err(e) = write_file(&env_example_path, ENV_EXAMPLE, config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("env", ".env.example");
    }

    let gitignore_path = base_path.join(".gitignore");
    if gitignore_path.exists() {
        output.skipped(".gitignore", "already exists");
    } else if let Err(e) = write_file(&gitignore_path, GITIGNORE, false) {
        output.warning(&format!("Failed to create .gitignore: {}", e));
    } else {
        output.created("file", ".gitignore");
    }

    output.complete("S.A.G.E project initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set GEMINI_API_KEY (and OPENWEATHER_API_KEY)");
    output.newline();
    output.info("2. Verify the Gemini key:");
    output.command("sage-server check");
    output.newline();
    output.info("3. Start the server:");
    output.command("sage-server");
    output.newline();

    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));
    output.hint("API docs available at /swagger-ui/ (requires 'swagger-ui' feature)");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(()); // Skip existing files unless force is true
    }
    fs::write(path, content)
}

fn generate_sage_toml(config: &InitConfig) -> String {
    format!(
        r#"# S.A.G.E configuration
# Secrets are read from the environment variables named by `api_key_env`.

[server]
host = "{host}"
port = {port}
log_level = "info"
log_format = "pretty"   # or "json"

[gemini]
api_key_env = "GEMINI_API_KEY"
model = "gemini-2.0-flash"
fallback_models = ["gemini-1.5-flash", "gemini-1.5-pro", "gemini-1.0-pro"]
max_output_tokens = 1024
timeout_secs = 30

# Spacing between model calls; free-tier keys reject bursts
[pacing]
min_interval_ms = 5000
error_interval_ms = 10000

[weather]
enabled = true
api_key_env = "OPENWEATHER_API_KEY"
units = "metric"

[wikipedia]
enabled = true

[memory]
capacity = 5
include_in_prompt = false
prompt_window = 3

[planner]
mode = "model"          # or "keyword" to skip the analysis call

[agent]
degraded_answers = false
max_query_chars = 4000
"#,
        host = config.host,
        port = config.port
    )
}

const ENV_EXAMPLE: &str = r#"# Google AI Studio key (required)
GEMINI_API_KEY=

# OpenWeather key (optional; weather lookups fail without it)
OPENWEATHER_API_KEY=

# Overrides server.log_level, e.g. "sage=debug,tower_http=debug"
# RUST_LOG=info
"#;

const GITIGNORE: &str = r#"/target
.env
"#;
