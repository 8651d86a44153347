//! Core trait definitions for the storage abstraction layer

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::StorageResult;
use super::types::*;
use crate::model::{
    Assignment, AssignmentId, DateSelector, Exercise, ExerciseId, Patient, PatientId,
    PatientStatus, ReportId, Routine, RoutineId, SymptomReport,
};

/// Unified storage interface providing access to all storage subsystems
#[async_trait]
pub trait UnifiedStorage: Send + Sync {
    fn assignment_storage(&self) -> &dyn AssignmentStorage;

    fn patient_storage(&self) -> &dyn PatientStorage;

    fn catalog_storage(&self) -> &dyn CatalogStorage;

    fn report_storage(&self) -> &dyn ReportStorage;

    /// Check the health of the storage backend
    async fn health_check(&self) -> StorageResult<HealthStatus>;
}

/// Assignment rows with the (patient, routine, date) uniqueness constraint
#[async_trait]
pub trait AssignmentStorage: Send + Sync {
    /// Insert a new assignment
    ///
    /// Fails with `Conflict` if the triple exists, `NotFound` if the patient
    /// is missing or not active, or if the routine is missing. The checks and
    /// the insert happen atomically.
    async fn create(&self, new: NewAssignment) -> StorageResult<Assignment>;

    /// Delete by id; deleting an absent id is `NotFound`
    async fn delete(&self, id: AssignmentId) -> StorageResult<()>;

    /// Assignments for one patient ordered by date, then insertion order
    async fn list(&self, patient_id: PatientId, dates: DateSelector)
        -> StorageResult<Vec<Assignment>>;

    async fn get(&self, id: AssignmentId) -> StorageResult<Option<Assignment>>;
}

/// Patient records owned by user management
#[async_trait]
pub trait PatientStorage: Send + Sync {
    async fn insert(&self, new: NewPatient) -> StorageResult<Patient>;

    async fn get(&self, id: PatientId) -> StorageResult<Option<Patient>>;

    async fn list(&self) -> StorageResult<Vec<Patient>>;

    async fn set_status(&self, id: PatientId, status: PatientStatus) -> StorageResult<Patient>;

    /// Remove a patient and, by cascade, their assignments and reports
    async fn delete(&self, id: PatientId) -> StorageResult<()>;
}

/// Exercise and routine definitions
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    async fn insert_exercise(&self, new: NewExercise) -> StorageResult<Exercise>;

    async fn get_exercise(&self, id: ExerciseId) -> StorageResult<Option<Exercise>>;

    async fn list_exercises(&self) -> StorageResult<Vec<Exercise>>;

    /// Insert a routine; every referenced exercise must exist
    async fn insert_routine(&self, new: NewRoutine) -> StorageResult<Routine>;

    async fn get_routine(&self, id: RoutineId) -> StorageResult<Option<Routine>>;

    async fn list_routines(&self) -> StorageResult<Vec<Routine>>;

    /// Replace name, description and the whole exercise list in one step
    async fn replace_routine(&self, id: RoutineId, new: NewRoutine) -> StorageResult<Routine>;

    /// Drop one exercise from a routine and renumber the rest in one step
    async fn remove_routine_exercise(
        &self,
        id: RoutineId,
        exercise_id: ExerciseId,
    ) -> StorageResult<Routine>;

    /// Delete a routine and cascade to its assignments, returning how many went with it
    async fn delete_routine(&self, id: RoutineId) -> StorageResult<usize>;
}

/// Daily symptom reports, unique per (patient, date)
#[async_trait]
pub trait ReportStorage: Send + Sync {
    async fn insert(&self, new: NewReport) -> StorageResult<SymptomReport>;

    async fn update(&self, id: ReportId, new: NewReport) -> StorageResult<SymptomReport>;

    async fn find(
        &self,
        patient_id: PatientId,
        date: NaiveDate,
    ) -> StorageResult<Option<SymptomReport>>;

    async fn delete(&self, id: ReportId) -> StorageResult<()>;

    /// All reports for a patient, newest date first
    async fn list_for_patient(&self, patient_id: PatientId) -> StorageResult<Vec<SymptomReport>>;

    async fn list_all(&self) -> StorageResult<Vec<SymptomReport>>;
}
