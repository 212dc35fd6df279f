//! sage-server entry point
//!
//! - `sage-server` - Start the HTTP server (default)
//! - `sage-server init` - Scaffold sage.toml and .env.example
//! - `sage-server check` - Send a test prompt to Gemini and list models
//! - `sage-server config` - Show (and optionally validate) the configuration

use anyhow::Context;
use owo_colors::OwoColorize;
use sage::{
    cli::{
        init::{self, InitConfig, InitResult},
        output::Output,
        Cli, Commands,
    },
    utils::toml_config::{LogFormat, SageConfig},
    AppState, GeminiClient, LLMClient, SageConfigManager,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    host,
                    port,
                },
                &output,
            );
            match result {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => anyhow::bail!("init failed: {}", e),
            }
        }
        Some(Commands::Check { prompt }) => check(&cli.config, &prompt, &output).await,
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, &output),
        None => serve(&cli.config, cli.verbose).await,
    }
}

fn init_tracing(config: &SageConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", default_level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(config_path: &Path, verbose: bool) -> anyhow::Result<()> {
    let config_manager = SageConfigManager::new(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let config = config_manager.config();

    init_tracing(&config, verbose);

    for warning in config.validate_with_warnings()? {
        warn!("{}", warning);
    }

    if let Err(e) = config_manager.start_watching() {
        warn!("Configuration hot reload disabled: {}", e);
    }

    let state = AppState::from_config(Arc::new(config_manager))?;
    info!(
        model = %state.agent.model_name(),
        tools = ?state.agent.tools().tool_names(),
        memory_capacity = state.memory.capacity(),
        "Agent ready"
    );

    let app = sage::create_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("S.A.G.E listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn check(config_path: &Path, prompt: &str, output: &Output) -> anyhow::Result<()> {
    let config = if config_path.exists() {
        SageConfig::parse_file(config_path)?
    } else {
        output.info(&format!(
            "{} not found, using default configuration",
            config_path.display()
        ));
        SageConfig::default()
    };

    output.header("Gemini Check");
    let client = GeminiClient::from_config(&config.gemini)?;
    output.kv("api base", &config.gemini.api_base);
    output.model_chain(&config.gemini.model_chain());

    output.subheader("Test prompt");
    output.kv("prompt", prompt);
    match client.generate(prompt).await {
        Ok(reply) => {
            output.success(&format!("{} responded", client.model_name()));
            output.kv("reply", reply.trim());
        }
        Err(e) => output.error(&e.to_string()),
    }

    output.subheader("Available Gemini models");
    match client.list_models().await {
        Ok(models) if models.is_empty() => output.warning("No Gemini models visible to this key"),
        Ok(models) => models.iter().for_each(|m| output.list_item(m)),
        Err(e) => output.error(&e.to_string()),
    }

    Ok(())
}

fn show_config(config_path: &Path, validate: bool, output: &Output) -> anyhow::Result<()> {
    let config = SageConfig::parse_file(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;

    output.header(&format!("Configuration ({})", config_path.display()));
    output.kv("listen", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("log level", &config.server.log_level);
    output.model_chain(&config.gemini.model_chain());
    output.kv("gemini key env", &config.gemini.api_key_env);
    output.kv(
        "pacing",
        &format!(
            "{} ms ({} ms after errors)",
            config.pacing.min_interval_ms, config.pacing.error_interval_ms
        ),
    );
    output.toggle("weather", config.weather.enabled);
    output.toggle("wikipedia", config.wikipedia.enabled);
    output.kv("memory capacity", &config.memory.capacity.to_string());
    output.kv("planner", &format!("{:?}", config.planner.mode).to_lowercase());
    output.toggle("degraded answers", config.agent.degraded_answers);
    output.toggle("history in prompt", config.memory.include_in_prompt);

    if validate {
        output.subheader("Validation");
        match config.validate_with_warnings() {
            Ok(warnings) => {
                for warning in &warnings {
                    output.warning(&warning.message);
                }
                output.success("Configuration is valid");
            }
            Err(e) => {
                output.error(&e.to_string());
                anyhow::bail!("configuration is invalid");
            }
        }
    } else {
        output.hint("Run with --validate to check env vars and consistency");
    }

    Ok(())
}
