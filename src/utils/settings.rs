use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::utils::constants::{
    DEFAULT_ARCHIVE_BASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// How a failed load is surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Return the error
    #[default]
    Propagate,
    /// Log the error and keep serving the previous data
    KeepLastGood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub archive_base_url: String,
    pub request_timeout_secs: u64,
    pub error_policy: ErrorPolicy,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            error_policy: ErrorPolicy::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Defaults overridden by `AIR_MONITOR_*` environment variables
    pub fn load() -> Result<Self> {
        Self::build(None)
    }

    /// Defaults, then `path`, then `AIR_MONITOR_*` environment variables
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::build(Some(path))
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("archive_base_url", defaults.archive_base_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("error_policy", "propagate")?
            .set_default("log_level", defaults.log_level)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix("AIR_MONITOR").try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
