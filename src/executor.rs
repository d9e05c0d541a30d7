//! `executor.json`: the build/CI context shown in the report's Executors widget.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ExecutorConfig;
use crate::error::{IoResultExt, Result};
use crate::platform::PlatformInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorRecord {
    pub name: String,
    pub build_name: String,
    #[serde(rename = "type")]
    pub executor_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_order: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,
}

impl ExecutorRecord {
    /// `name` is the current user; `buildName` falls back to the OS name.
    pub fn collect(config: &ExecutorConfig, platform: &PlatformInfo) -> Self {
        Self {
            name: platform.user.clone(),
            build_name: config
                .build_name
                .clone()
                .unwrap_or_else(|| platform.os_name.clone()),
            executor_type: config.executor_type.clone(),
            build_order: config.build_order,
            build_url: config.build_url.clone(),
            report_url: config.report_url.clone(),
            report_name: config.report_name.clone(),
        }
    }

    /// Serialize to `path`, replacing any existing file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(self)?;
        json.push(b'\n');
        std::fs::write(path, json).at_path(path)?;
        info!(path = %path.display(), "Executor JSON file created");
        Ok(())
    }
}
