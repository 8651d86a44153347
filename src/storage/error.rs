//! Error types for the storage abstraction layer

use crate::error::{ErrorCode, PlannerError};
use std::fmt;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Referenced row does not exist (or is not eligible)
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Uniqueness constraint violated
    #[error("Unique constraint violated on {constraint}: {key}")]
    Conflict {
        constraint: &'static str,
        key: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    pub fn serialization<E: fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }

    pub fn not_found<K: fmt::Display>(entity: &'static str, key: K) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn conflict<K: fmt::Display>(constraint: &'static str, key: K) -> Self {
        Self::Conflict {
            constraint,
            key: key.to_string(),
        }
    }

    pub fn configuration<E: fmt::Display>(msg: E) -> Self {
        Self::Configuration(msg.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Translate storage failures into the application taxonomy
///
/// Constraint names and backend messages stay in the developer message only.
impl From<StorageError> for PlannerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, key } => {
                PlannerError::not_found(entity, format!("{} {}", entity, key))
            }
            StorageError::Conflict { constraint, key } => match constraint {
                "assignment_triple" => {
                    PlannerError::conflict(format!("routine already assigned: {}", key))
                }
                "report_per_day" => PlannerError::conflict_with_code(
                    ErrorCode::REPORT_ALREADY_SUBMITTED,
                    "A symptom report was already submitted today",
                ),
                _ => PlannerError::conflict_with_code(
                    ErrorCode::CATALOG_DUPLICATE_NAME,
                    format!("'{}' is already in use", key),
                ),
            },
            StorageError::Serialization(msg) => {
                PlannerError::storage_with_code(ErrorCode::STORAGE_SERIALIZATION_ERROR, msg)
            }
            StorageError::Configuration(msg) => PlannerError::config(msg),
            StorageError::Io(e) => {
                PlannerError::storage_with_code(ErrorCode::STORAGE_IO_ERROR, "storage I/O failed")
                    .with_source(e)
            }
        }
    }
}
