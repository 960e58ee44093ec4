//! Command-line interface for the statescope utility
//!
//! Provides a CLI to check state diagram text and inspect the state model
//! built from it.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;

use crate::tree::ModelSummary;
use statescope::core::logging::init_logging;
use statescope::core::Database as _;
use statescope::plugins::state::StateDatabase;
use statescope::{build_with_config, ModelConfig};

/// Statescope - Check state diagrams and print their state hierarchy
#[derive(Parser)]
#[command(name = "statescope")]
#[command(about = "Build and validate the semantic model of a state diagram")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Namespace separator for hierarchical identifiers
    #[arg(long, default_value = ".", global = true)]
    pub separator: String,

    /// Treat every identifier as a single name
    #[arg(long, conflicts_with = "separator", global = true)]
    pub no_separator: bool,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate a state diagram
    Check {
        /// Input file containing the diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the state hierarchy and transitions of a diagram
    Tree {
        /// Input file containing the diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Main CLI application
pub struct StatescopeApp {
    config: ModelConfig,
}

impl StatescopeApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    /// Create a new application instance with a model config
    pub fn with_config(config: ModelConfig) -> Self {
        Self { config }
    }

    fn build_config(cli: &Cli) -> ModelConfig {
        let separator = if cli.no_separator {
            None
        } else {
            Some(cli.separator.as_str())
        };
        ModelConfig::new().with_separator(separator)
    }

    /// Run the application with the given CLI arguments
    pub fn run(mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over CLI flags
        let log_level_str = std::env::var("STATESCOPE_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("STATESCOPE_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Statescope v{}", env!("CARGO_PKG_VERSION"));
        }

        self.config = Self::build_config(&cli);
        debug!(separator = ?self.config.separator(), "Using model configuration");

        match cli.command {
            Commands::Check { input } => self.check_command(input, cli.verbose),
            Commands::Tree { input, json } => self.tree_command(input, json, cli.verbose),
        }
    }

    fn build_model(&self, input: Option<PathBuf>, verbose: bool) -> Result<StateDatabase> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        build_with_config(&content, self.config.clone())
    }

    /// Handle the check command
    fn check_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        match self.build_model(input, verbose) {
            Ok(model) => {
                if verbose {
                    eprintln!(
                        "Built {} states and {} transitions",
                        model.node_count(),
                        model.edge_count()
                    );
                }
                println!("✓ Valid state diagram");
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid state diagram: {}", e);
                Err(e)
            }
        }
    }

    /// Handle the tree command
    fn tree_command(&self, input: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
        let model = self.build_model(input, verbose)?;
        let summary = ModelSummary::from_model(&model);

        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print!("{}", summary.to_text());
        }
        Ok(())
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Model configuration in effect (for testing)
    #[cfg(test)]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

impl Default for StatescopeApp {
    fn default() -> Self {
        Self::new()
    }
}
