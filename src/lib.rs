//! Allure Configurator -- prepares an Allure results directory before report
//! generation.
//!
//! A run carries the previous report's history into the new results
//! directory, then writes `environment.properties` and `executor.json`.

pub mod config;
pub mod configurator;
pub mod data_reader;
pub mod environment;
pub mod error;
pub mod executor;
pub mod history;
pub mod platform;
pub mod properties;

pub use config::ConfiguratorConfig;
pub use configurator::{ConfigureReport, Configurator};
pub use error::{ConfigureError, Result};

/// Load the default configuration and run all steps.
pub fn configure() -> anyhow::Result<ConfigureReport> {
    let config = ConfiguratorConfig::load_or_default();
    let report = Configurator::from_config(config).configure()?;
    Ok(report)
}
