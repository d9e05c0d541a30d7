//! `environment.properties`: the Environment widget on the report overview.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::info;

use crate::config::EnvironmentConfig;
use crate::data_reader::DataReader;
use crate::error::{ConfigureError, IoResultExt, Result};
use crate::platform::PlatformInfo;
use crate::properties::Properties;

pub const KEY_USER: &str = "User";
pub const KEY_BROWSER: &str = "Browser";
pub const KEY_FLIGHTS_URL: &str = "Flights.URL";
pub const KEY_HOTEL_URL: &str = "Hotel.URL";
pub const KEY_OS: &str = "OS";

/// Keys every environment record carries, in write order.
pub const FIXED_KEYS: [&str; 5] = [KEY_USER, KEY_BROWSER, KEY_FLIGHTS_URL, KEY_HOTEL_URL, KEY_OS];

/// Ordered environment facts for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRecord {
    props: Properties,
}

impl EnvironmentRecord {
    /// Gather the fixed entries, then any configured extras.
    pub fn collect(
        config: &EnvironmentConfig,
        platform: &PlatformInfo,
        reader: &dyn DataReader,
    ) -> Result<Self> {
        let mut props = Properties::new();
        props.set(KEY_USER, platform.user.as_str());
        props.set(KEY_BROWSER, config.browser.as_str());
        props.set(KEY_FLIGHTS_URL, reader.require(&config.flights_url_key)?);
        props.set(KEY_HOTEL_URL, reader.require(&config.hotel_url_key)?);
        props.set(KEY_OS, platform.os_name.as_str());

        for (key, value) in &config.extra {
            if FIXED_KEYS.contains(&key.as_str()) {
                return Err(ConfigureError::Config(format!(
                    "environment.extra cannot override fixed key '{key}'"
                )));
            }
            props.set(key.as_str(), value.as_str());
        }

        Ok(Self { props })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key)
    }

    pub fn properties(&self) -> &Properties {
        &self.props
    }

    /// Store the record at `path`, replacing any existing file.
    pub fn write(&self, path: &Path, comment: &str) -> Result<()> {
        let file = File::create(path).at_path(path)?;
        self.props
            .store(BufWriter::new(file), Some(comment))
            .at_path(path)?;
        info!(path = %path.display(), "Environment properties file created");
        Ok(())
    }
}
