use std::path::PathBuf;

use allure_configurator::{Configurator, ConfiguratorConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "allure-configurator",
    about = "Prepare an Allure results directory: history, environment and executor metadata",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file (defaults to $ALLURE_CONFIGURATOR_CONFIG,
    /// then ./allure-configurator.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy report history and write environment.properties + executor.json
    Configure {
        /// Results directory (overrides paths.results_dir)
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Previous report directory (overrides paths.report_dir)
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Data properties file with service URLs (overrides data.properties_file)
        #[arg(long)]
        data_file: Option<PathBuf>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfiguratorConfig::load(path)?,
        None => ConfiguratorConfig::load_or_default(),
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Configure {
            results_dir,
            report_dir,
            data_file,
            json,
        } => {
            if let Some(dir) = results_dir {
                config.paths.results_dir = dir;
            }
            if let Some(dir) = report_dir {
                config.paths.report_dir = dir;
            }
            if let Some(file) = data_file {
                config.data.properties_file = file;
            }

            tracing::info!(results_dir = %config.paths.results_dir.display(), "Configuring Allure results");
            let report = Configurator::from_config(config)
                .configure()
                .context("failed to configure Allure results")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Results directory: {}", report.results_dir.display());
                match report.history {
                    allure_configurator::history::HistoryOutcome::Skipped => {
                        println!("History:           none found, skipped");
                    }
                    allure_configurator::history::HistoryOutcome::Copied { files, bytes, .. } => {
                        println!("History:           {} file(s), {} bytes copied", files, bytes);
                    }
                }
                println!("Environment:       {}", report.environment_file.display());
                println!("Executor:          {}", report.executor_file.display());
            }
        }
        Commands::ShowConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
