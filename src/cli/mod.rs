//! CLI module for S.A.G.E
//!
//! Provides command-line interface parsing and handling for the sage-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// S.A.G.E - Search-Augmented Gemini Endpoint
///
/// An agent backend that answers queries with Google Gemini, enriched with
/// OpenWeather and Wikipedia lookups, and remembers recent exchanges.
#[derive(Parser, Debug)]
#[command(
    name = "sage-server",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "S.A.G.E - Search-Augmented Gemini Endpoint",
    long_about = "An agent backend that answers queries with Google Gemini, enriched with\n\
                  OpenWeather and Wikipedia lookups, and remembers recent exchanges.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new project.",
    after_help = "EXAMPLES:\n    \
                  sage-server init              # Scaffold sage.toml and .env.example\n    \
                  sage-server check             # Verify the Gemini API key and list models\n    \
                  sage-server                   # Start the server (requires sage.toml)\n    \
                  sage-server --config my.toml  # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "sage.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new S.A.G.E project with configuration files
    ///
    /// Creates sage.toml, .env.example and .gitignore.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Send a test prompt to Gemini and list the available models
    Check {
        /// Prompt to send
        #[arg(short, long, default_value = "Hello, can you respond with a simple greeting?")]
        prompt: String,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
