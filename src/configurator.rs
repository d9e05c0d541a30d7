//! The three-step configure run.

use std::borrow::Cow;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::config::ConfiguratorConfig;
use crate::data_reader::{DataReader, PropertiesDataReader};
use crate::environment::EnvironmentRecord;
use crate::error::Result;
use crate::executor::ExecutorRecord;
use crate::history::{self, HistoryOutcome};
use crate::platform::PlatformInfo;

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigureReport {
    pub results_dir: PathBuf,
    pub results_dir_created: bool,
    pub history: HistoryOutcome,
    pub environment_file: PathBuf,
    pub executor_file: PathBuf,
}

/// Prepares a results directory for report generation.
///
/// Steps run strictly in order and the first failure is returned as is;
/// whatever earlier steps wrote stays on disk. Platform facts and the data
/// reader are only resolved once the results directory and history are in
/// place.
pub struct Configurator {
    config: ConfiguratorConfig,
    platform: Option<PlatformInfo>,
    reader: Option<Box<dyn DataReader>>,
}

impl Configurator {
    /// Run with explicit platform facts and data source.
    pub fn new(
        config: ConfiguratorConfig,
        platform: PlatformInfo,
        reader: Box<dyn DataReader>,
    ) -> Self {
        Self {
            config,
            platform: Some(platform),
            reader: Some(reader),
        }
    }

    /// Detect platform facts and open `data.properties_file` during
    /// [`Configurator::configure`], after the history step.
    pub fn from_config(config: ConfiguratorConfig) -> Self {
        Self {
            config,
            platform: None,
            reader: None,
        }
    }

    pub fn config(&self) -> &ConfiguratorConfig {
        &self.config
    }

    pub fn configure(&self) -> Result<ConfigureReport> {
        let paths = &self.config.paths;

        // 1. Results directory + history carry-over
        let results_dir_created = history::ensure_results_dir(paths)?;
        let history = history::copy_history(paths)?;

        let platform = match &self.platform {
            Some(platform) => Cow::Borrowed(platform),
            None => Cow::Owned(PlatformInfo::detect(&self.config.platform)?),
        };
        let opened;
        let reader: &dyn DataReader = match &self.reader {
            Some(reader) => reader.as_ref(),
            None => {
                opened = PropertiesDataReader::open(&self.config.data.properties_file)?;
                &opened
            }
        };

        // 2. environment.properties
        let environment_file = paths.environment_file();
        EnvironmentRecord::collect(&self.config.environment, &platform, reader)?
            .write(&environment_file, &self.config.environment.comment)?;

        // 3. executor.json
        let executor_file = paths.executor_file();
        ExecutorRecord::collect(&self.config.executor, &platform).write(&executor_file)?;

        info!(results_dir = %paths.results_dir.display(), "Allure results configured");

        Ok(ConfigureReport {
            results_dir: paths.results_dir.clone(),
            results_dir_created,
            history,
            environment_file,
            executor_file,
        })
    }
}
