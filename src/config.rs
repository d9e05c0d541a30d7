//! TOML configuration for a configurator run.
//!
//! Every path and constant the run touches lives here, so a run is fully
//! described by one `ConfiguratorConfig` value. Defaults reproduce the
//! conventional Allure layout relative to the working directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Environment variable naming a config file to load first.
pub const CONFIG_ENV_VAR: &str = "ALLURE_CONFIGURATOR_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "allure-configurator.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for one configurator run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfiguratorConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configurator configuration");
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. The path named by `ALLURE_CONFIGURATOR_CONFIG`.
    /// 2. `allure-configurator.toml` in the working directory.
    /// 3. Compiled-in defaults.
    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "{CONFIG_ENV_VAR} set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local_path = Path::new(DEFAULT_CONFIG_FILE);
        if local_path.exists() {
            match Self::load(local_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %local_path.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Locations of the results and report directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root for this run's report artifacts. Created if missing.
    pub results_dir: PathBuf,
    /// Previously generated report, whose history is carried over.
    pub report_dir: PathBuf,
    /// Name of the history subfolder in both directories.
    pub history_dir_name: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("allure-results"),
            report_dir: PathBuf::from("allure-report"),
            history_dir_name: "history".to_string(),
        }
    }
}

impl PathsConfig {
    /// `<results_dir>/history`, the copy destination.
    pub fn results_history_dir(&self) -> PathBuf {
        self.results_dir.join(&self.history_dir_name)
    }

    /// `<report_dir>/history`, the copy source.
    pub fn report_history_dir(&self) -> PathBuf {
        self.report_dir.join(&self.history_dir_name)
    }

    pub fn environment_file(&self) -> PathBuf {
        self.results_dir.join("environment.properties")
    }

    pub fn executor_file(&self) -> PathBuf {
        self.results_dir.join("executor.json")
    }
}

// ---------------------------------------------------------------------------
// Environment record
// ---------------------------------------------------------------------------

/// Inputs for `environment.properties`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Value written under `Browser`.
    pub browser: String,
    /// Data-reader key holding the flight-booking service URL.
    pub flights_url_key: String,
    /// Data-reader key holding the hotel-booking service URL.
    pub hotel_url_key: String,
    /// Header comment for the properties file.
    pub comment: String,
    /// Additional entries appended after the fixed ones.
    pub extra: BTreeMap<String, String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            browser: "Chrome".to_string(),
            flights_url_key: "FlightBooking.url".to_string(),
            hotel_url_key: "HotelBooking.url".to_string(),
            comment: "Properties file for Allure environment".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Executor record
// ---------------------------------------------------------------------------

/// Inputs for `executor.json`. Optional fields are omitted when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Value written under `type`.
    pub executor_type: String,
    /// Overrides `buildName`; the OS name is used when unset.
    pub build_name: Option<String>,
    pub build_order: Option<u64>,
    pub build_url: Option<String>,
    pub report_url: Option<String>,
    pub report_name: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            executor_type: "jenkins".to_string(),
            build_name: None,
            build_order: None,
            build_url: None,
            report_url: None,
            report_name: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where external configuration lookups (service URLs) are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// `.properties` file backing the default data reader.
    pub properties_file: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            properties_file: PathBuf::from("src/test/resources/config.properties"),
        }
    }
}

// ---------------------------------------------------------------------------
// Platform overrides
// ---------------------------------------------------------------------------

/// Overrides for detected platform facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub user: Option<String>,
    pub os_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
