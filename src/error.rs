//! Error taxonomy for the configurator.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigureError>;

#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("required property '{key}' is not defined")]
    MissingProperty { key: String },

    #[error("malformed properties input at line {line}: {message}")]
    Properties { line: usize, message: String },

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot determine platform facts: {0}")]
    Platform(String),
}

impl ConfigureError {
    /// Wrap an `io::Error` with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Attach a path to an `io::Result`, the way `anyhow::Context` would.
pub(crate) trait IoResultExt<T> {
    fn at_path(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at_path(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|e| ConfigureError::io(path, e))
    }
}
