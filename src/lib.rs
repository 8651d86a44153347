//! # Physio Planner
//!
//! Routine assignment calendar and guided exercise execution for a
//! physiotherapy clinic.
//!
//! ## Modules
//!
//! - `scheduler` - Assign routines to patients on calendar days
//! - `plan` - Resolve what a patient performs on a given day
//! - `execution` - State machine and countdown timer for a guided session
//! - `catalog` - Exercises, routines and the dosage parser they rely on
//! - `directory` - Patients and their eligibility for assignments
//! - `reports` - Daily symptom reports
//! - `storage` - Async storage traits with memory and JSON file backends
//! - `api` - axum HTTP surface over the services
//! - `config` - TOML and environment configuration
pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod execution;
pub mod model;
pub mod plan;
pub mod reports;
pub mod scheduler;
pub mod storage;

pub use error::{PlannerError, Result};
