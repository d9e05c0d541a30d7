//! External configuration lookups (service URLs and the like).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConfigureError, IoResultExt, Result};
use crate::properties::Properties;

/// A key/value source the configurator reads service URLs from.
pub trait DataReader {
    fn get_property(&self, key: &str) -> Option<String>;

    /// Look up `key`, failing when it is not defined.
    fn require(&self, key: &str) -> Result<String> {
        self.get_property(key)
            .ok_or_else(|| ConfigureError::MissingProperty {
                key: key.to_string(),
            })
    }
}

/// Reader backed by a `.properties` file, loaded once at open.
#[derive(Debug, Clone)]
pub struct PropertiesDataReader {
    path: PathBuf,
    props: Properties,
}

impl PropertiesDataReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).at_path(path)?;
        let props = Properties::parse(&content)?;
        if props.is_empty() {
            warn!(path = %path.display(), "data properties file defines no entries");
        }
        debug!(path = %path.display(), entries = props.len(), "loaded data properties");
        Ok(Self {
            path: path.to_path_buf(),
            props,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataReader for PropertiesDataReader {
    fn get_property(&self, key: &str) -> Option<String> {
        self.props.get(key).map(str::to_string)
    }
}

/// In-memory reader for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDataReader {
    values: HashMap<String, String>,
}

impl StaticDataReader {
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl DataReader for StaticDataReader {
    fn get_property(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
