//! Storage abstraction layer
//!
//! The relational store is an external collaborator in production; this
//! module defines the narrow async traits the services depend on, plus two
//! in-process backends. Uniqueness constraints are enforced inside the
//! backends so that racing inserts are arbitrated by the store itself.

pub mod backends;
pub mod config;
pub mod error;
pub mod factory;
pub mod state;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use backends::{FileBackend, MemoryBackend};
pub use config::{BackendType, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use factory::StorageFactory;
pub use traits::{AssignmentStorage, CatalogStorage, PatientStorage, ReportStorage, UnifiedStorage};
pub use types::{HealthStatus, NewAssignment, NewExercise, NewPatient, NewReport, NewRoutine};
