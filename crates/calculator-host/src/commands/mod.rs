//! CLI command definitions and dispatch.

pub mod call;
pub mod check;
pub mod config;
pub mod load;

use clap::{Parser, Subcommand};

use calculator_core::config::HostConfig;
use calculator_core::error::AppError;
use calculator_core::logging;
use calculator_host::PluginHost;

use crate::output::OutputFormat;

/// Calculator host: loads the calculator plugin and calls into it
#[derive(Debug, Parser)]
#[command(name = "calculator-host", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/host.toml")]
    pub config: String,

    /// Plugin shared library, overriding `plugin.library_path`
    #[arg(short, long)]
    pub library: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Call one arithmetic export
    Call(call::CallArgs),
    /// Run the plugin's Load hook
    Load(load::LoadArgs),
    /// Run the reference checks against every export
    Check,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> Result<(), AppError> {
        let config = self.load_config()?;
        logging::init_logging(&config.logging)?;

        match &self.command {
            Commands::Call(args) => call::execute(args, &open_host(&config)?, self.format),
            Commands::Load(args) => load::execute(args, &open_host(&config)?),
            Commands::Check => check::execute(&open_host(&config)?, self.format),
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }

    /// Loads configuration and applies command-line overrides.
    fn load_config(&self) -> Result<HostConfig, AppError> {
        let mut config = HostConfig::load(&self.config)?;
        if let Some(library) = &self.library {
            config.plugin.library_path = Some(library.clone());
        }
        Ok(config)
    }
}

/// Helper: open the plugin described by the configuration
fn open_host(config: &HostConfig) -> Result<PluginHost, AppError> {
    Ok(PluginHost::open(&config.plugin)?)
}
