//! In-memory storage backend

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::model::{
    Assignment, AssignmentId, DateSelector, Exercise, ExerciseId, Patient, PatientId,
    PatientStatus, ReportId, Routine, RoutineId, SymptomReport,
};
use crate::storage::{error::StorageResult, state::StorageState, traits::*, types::*};

/// In-memory storage backend
///
/// Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<RwLock<StorageState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnifiedStorage for MemoryBackend {
    fn assignment_storage(&self) -> &dyn AssignmentStorage {
        self
    }

    fn patient_storage(&self) -> &dyn PatientStorage {
        self
    }

    fn catalog_storage(&self) -> &dyn CatalogStorage {
        self
    }

    fn report_storage(&self) -> &dyn ReportStorage {
        self
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        Ok(self.state.read().await.health("memory"))
    }
}

#[async_trait]
impl AssignmentStorage for MemoryBackend {
    async fn create(&self, new: NewAssignment) -> StorageResult<Assignment> {
        self.state.write().await.create_assignment(new)
    }

    async fn delete(&self, id: AssignmentId) -> StorageResult<()> {
        self.state.write().await.delete_assignment(id)
    }

    async fn list(
        &self,
        patient_id: PatientId,
        dates: DateSelector,
    ) -> StorageResult<Vec<Assignment>> {
        Ok(self.state.read().await.list_assignments(patient_id, dates))
    }

    async fn get(&self, id: AssignmentId) -> StorageResult<Option<Assignment>> {
        Ok(self.state.read().await.get_assignment(id))
    }
}

#[async_trait]
impl PatientStorage for MemoryBackend {
    async fn insert(&self, new: NewPatient) -> StorageResult<Patient> {
        self.state.write().await.insert_patient(new)
    }

    async fn get(&self, id: PatientId) -> StorageResult<Option<Patient>> {
        Ok(self.state.read().await.get_patient(id))
    }

    async fn list(&self) -> StorageResult<Vec<Patient>> {
        Ok(self.state.read().await.list_patients())
    }

    async fn set_status(&self, id: PatientId, status: PatientStatus) -> StorageResult<Patient> {
        self.state.write().await.set_patient_status(id, status)
    }

    async fn delete(&self, id: PatientId) -> StorageResult<()> {
        self.state.write().await.delete_patient(id)
    }
}

#[async_trait]
impl CatalogStorage for MemoryBackend {
    async fn insert_exercise(&self, new: NewExercise) -> StorageResult<Exercise> {
        self.state.write().await.insert_exercise(new)
    }

    async fn get_exercise(&self, id: ExerciseId) -> StorageResult<Option<Exercise>> {
        Ok(self.state.read().await.get_exercise(id))
    }

    async fn list_exercises(&self) -> StorageResult<Vec<Exercise>> {
        Ok(self.state.read().await.list_exercises())
    }

    async fn insert_routine(&self, new: NewRoutine) -> StorageResult<Routine> {
        self.state.write().await.insert_routine(new)
    }

    async fn get_routine(&self, id: RoutineId) -> StorageResult<Option<Routine>> {
        Ok(self.state.read().await.get_routine(id))
    }

    async fn list_routines(&self) -> StorageResult<Vec<Routine>> {
        Ok(self.state.read().await.list_routines())
    }

    async fn replace_routine(&self, id: RoutineId, new: NewRoutine) -> StorageResult<Routine> {
        self.state.write().await.replace_routine(id, new)
    }

    async fn remove_routine_exercise(
        &self,
        id: RoutineId,
        exercise_id: ExerciseId,
    ) -> StorageResult<Routine> {
        self.state.write().await.remove_routine_exercise(id, exercise_id)
    }

    async fn delete_routine(&self, id: RoutineId) -> StorageResult<usize> {
        self.state.write().await.delete_routine(id)
    }
}

#[async_trait]
impl ReportStorage for MemoryBackend {
    async fn insert(&self, new: NewReport) -> StorageResult<SymptomReport> {
        self.state.write().await.insert_report(new)
    }

    async fn update(&self, id: ReportId, new: NewReport) -> StorageResult<SymptomReport> {
        self.state.write().await.update_report(id, new)
    }

    async fn find(
        &self,
        patient_id: PatientId,
        date: NaiveDate,
    ) -> StorageResult<Option<SymptomReport>> {
        Ok(self.state.read().await.find_report(patient_id, date))
    }

    async fn delete(&self, id: ReportId) -> StorageResult<()> {
        self.state.write().await.delete_report(id)
    }

    async fn list_for_patient(&self, patient_id: PatientId) -> StorageResult<Vec<SymptomReport>> {
        Ok(self.state.read().await.list_reports(Some(patient_id)))
    }

    async fn list_all(&self) -> StorageResult<Vec<SymptomReport>> {
        Ok(self.state.read().await.list_reports(None))
    }
}
