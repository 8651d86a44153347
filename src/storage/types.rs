//! Insert payloads and status types for the storage abstraction layer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{
    MediaRef, PatientId, PatientStatus, RoutineExercise, RoutineId, Symptom,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAssignment {
    pub patient_id: PatientId,
    pub routine_id: RoutineId,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub full_name: String,
    pub email: String,
    pub status: PatientStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    pub name: String,
    pub description: String,
    pub media: Option<MediaRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRoutine {
    pub name: String,
    pub description: String,
    pub exercises: Vec<RoutineExercise>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub patient_id: PatientId,
    pub date: NaiveDate,
    pub symptoms: Vec<Symptom>,
    pub comment: Option<String>,
}

/// Health status of storage backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub backend_type: String,
    pub assignments: usize,
    pub routines: usize,
    pub patients: usize,
}
