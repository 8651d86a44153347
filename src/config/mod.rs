//! Application configuration
//!
//! Defaults, then an optional TOML file, then `PHYSIO_*` environment
//! overrides. The result is validated before anything is built from it.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{common, ErrorCode, ErrorExt, PlannerError, Result};
use crate::execution::DEFAULT_REST_SECONDS;
use crate::storage::{BackendType, StorageConfig};

pub const ENV_BIND: &str = "PHYSIO_BIND";
pub const ENV_STORAGE_PATH: &str = "PHYSIO_STORAGE_PATH";
pub const ENV_LOG_LEVEL: &str = "PHYSIO_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Filter directive such as `info` or `physio_planner=debug`
    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Pause between series of the same exercise
    #[serde(default = "default_rest_interval", with = "humantime_serde")]
    pub rest_interval: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            rest_interval: default_rest_interval(),
        }
    }
}

fn default_rest_interval() -> Duration {
    Duration::from_secs(u64::from(DEFAULT_REST_SECONDS))
}

impl AppConfig {
    /// Load from an optional file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(common::config_not_found(path));
        }
        let text = std::fs::read_to_string(path)
            .to_config_error(format!("Failed to read {}", path.display()))?;
        let config = Self::from_toml(&text)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| {
            PlannerError::config_with_code(ErrorCode::CONFIG_PARSE_ERROR, "Invalid configuration file")
                .with_source(e)
        })
    }

    /// Apply `PHYSIO_*` overrides from the given lookup
    ///
    /// A storage path override also selects the file backend.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = bind;
        }
        if let Some(path) = lookup(ENV_STORAGE_PATH) {
            self.storage = StorageConfig::file(PathBuf::from(path));
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(level);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        let rest = self.execution.rest_interval;
        if rest < Duration::from_secs(1) || rest.subsec_nanos() != 0 {
            return Err(invalid_value(format!(
                "execution.rest_interval must be a whole number of seconds, at least 1s (got {:?})",
                rest
            )));
        }

        if let Some(path) = &self.storage.path {
            if path.as_os_str().is_empty() {
                return Err(invalid_value("storage.path must not be empty"));
            }
        }
        if self.storage.backend == BackendType::File && self.storage.resolved_path().is_none() {
            return Err(invalid_value(
                "storage.path is required when no data directory can be determined",
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|_| invalid_value(format!("server.bind '{}' is not a socket address", self.server.bind)))
    }

    /// Filter directive for the given `-v` count; an explicit level wins
    pub fn log_filter(&self, verbose: u8) -> String {
        if let Some(level) = &self.log_level {
            return level.clone();
        }
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).to_config_error("Failed to render configuration")
    }
}

fn invalid_value(message: impl Into<String>) -> PlannerError {
    PlannerError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, message)
}
