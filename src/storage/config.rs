//! Storage configuration types and utilities

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Memory storage (default, also used by tests)
    #[default]
    Memory,
    /// Single JSON document on disk
    File,
}

/// Main storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendType,

    /// Location of the JSON document for the file backend
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendType::File,
            path: Some(path.into()),
        }
    }

    /// Path the file backend will use, falling back to the platform data dir
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            ProjectDirs::from("org", "physio", "physio-planner")
                .map(|dirs| dirs.data_dir().join("planner.json"))
        })
    }
}
