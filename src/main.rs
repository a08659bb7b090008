//! ollama-init - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use ollama_init::{InitConfig, OllamaClient, Reconciler, report, verify};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "ollama-init")]
#[command(about = "Workshop environment provisioning for Ollama", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override Ollama host URL
    #[arg(long)]
    host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wait for the Ollama service and pull any missing required models
    Init,
    /// Report package importability and model presence without changing anything
    Verify,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    match cli.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .init();
        }
    }

    // Load configuration
    let mut config = InitConfig::load(cli.config)?;

    // CLI overrides
    if let Some(host) = cli.host {
        config.host = host;
    }

    config.validate()?;

    tracing::info!(
        host = %config.host,
        required_models = config.required_models.len(),
        max_attempts = config.max_attempts,
        "Configuration loaded"
    );

    let client = OllamaClient::new(config.host.clone());

    match cli.command {
        Command::Init => {
            let reconciler = Reconciler::new(client, config.retry_policy());
            let outcome = reconciler.run(&config.required_models).await;

            report::print_run_outcome(&outcome);

            if outcome.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Verify => {
            let packages = verify::check_packages(&config.python, &config.required_packages).await;
            let models = verify::check_models(&client, &config.required_models).await;

            report::print_verification(&packages, &models);

            // Informational only, never fails the process
            Ok(ExitCode::SUCCESS)
        }
    }
}
