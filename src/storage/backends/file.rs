//! File-based storage backend implementation
//!
//! All tables live in one JSON document. Each mutation is applied to a copy
//! of the tables, written to a temporary file and renamed over the document,
//! and only then published in memory. A failed write leaves both the file and
//! the in-memory view untouched.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::model::{
    Assignment, AssignmentId, DateSelector, Exercise, ExerciseId, Patient, PatientId,
    PatientStatus, ReportId, Routine, RoutineId, SymptomReport,
};
use crate::storage::{
    config::StorageConfig,
    error::{StorageError, StorageResult},
    state::StorageState,
    traits::*,
    types::*,
};

/// File-based storage backend
pub struct FileBackend {
    path: PathBuf,
    state: RwLock<StorageState>,
}

impl FileBackend {
    /// Create a new file backend from configuration
    pub async fn new(config: &StorageConfig) -> StorageResult<Self> {
        let path = config.resolved_path().ok_or_else(|| {
            StorageError::configuration("Could not determine a data directory for file storage")
        })?;
        Self::open(path).await
    }

    /// Open (or create) the document at `path`
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let state = if fs::try_exists(&path).await? {
            let content = fs::read_to_string(&path).await?;
            let state: StorageState = serde_json::from_str(&content)?;
            info!("Loaded planner storage from {}", path.display());
            state
        } else {
            info!("Creating planner storage at {}", path.display());
            StorageState::default()
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, state: &StorageState) -> StorageResult<()> {
        let content = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!("Persisted planner storage to {}", self.path.display());
        Ok(())
    }

    /// Run one mutation under the write lock and persist it before publishing
    async fn mutate<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut StorageState) -> StorageResult<T> + Send,
        T: Send,
    {
        let mut guard = self.state.write().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl UnifiedStorage for FileBackend {
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
        Ok(self.state.read().await.health("file"))
    }
}

#[async_trait]
impl AssignmentStorage for FileBackend {
    async fn create(&self, new: NewAssignment) -> StorageResult<Assignment> {
        self.mutate(|s| s.create_assignment(new)).await
    }

    async fn delete(&self, id: AssignmentId) -> StorageResult<()> {
        self.mutate(|s| s.delete_assignment(id)).await
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
impl PatientStorage for FileBackend {
    async fn insert(&self, new: NewPatient) -> StorageResult<Patient> {
        self.mutate(|s| s.insert_patient(new)).await
    }

    async fn get(&self, id: PatientId) -> StorageResult<Option<Patient>> {
        Ok(self.state.read().await.get_patient(id))
    }

    async fn list(&self) -> StorageResult<Vec<Patient>> {
        Ok(self.state.read().await.list_patients())
    }

    async fn set_status(&self, id: PatientId, status: PatientStatus) -> StorageResult<Patient> {
        self.mutate(|s| s.set_patient_status(id, status)).await
    }

    async fn delete(&self, id: PatientId) -> StorageResult<()> {
        self.mutate(|s| s.delete_patient(id)).await
    }
}

#[async_trait]
impl CatalogStorage for FileBackend {
    async fn insert_exercise(&self, new: NewExercise) -> StorageResult<Exercise> {
        self.mutate(|s| s.insert_exercise(new)).await
    }

    async fn get_exercise(&self, id: ExerciseId) -> StorageResult<Option<Exercise>> {
        Ok(self.state.read().await.get_exercise(id))
    }

    async fn list_exercises(&self) -> StorageResult<Vec<Exercise>> {
        Ok(self.state.read().await.list_exercises())
    }

    async fn insert_routine(&self, new: NewRoutine) -> StorageResult<Routine> {
        self.mutate(|s| s.insert_routine(new)).await
    }

    async fn get_routine(&self, id: RoutineId) -> StorageResult<Option<Routine>> {
        Ok(self.state.read().await.get_routine(id))
    }

    async fn list_routines(&self) -> StorageResult<Vec<Routine>> {
        Ok(self.state.read().await.list_routines())
    }

    async fn replace_routine(&self, id: RoutineId, new: NewRoutine) -> StorageResult<Routine> {
        self.mutate(|s| s.replace_routine(id, new)).await
    }

    async fn remove_routine_exercise(
        &self,
        id: RoutineId,
        exercise_id: ExerciseId,
    ) -> StorageResult<Routine> {
        self.mutate(|s| s.remove_routine_exercise(id, exercise_id))
            .await
    }

    async fn delete_routine(&self, id: RoutineId) -> StorageResult<usize> {
        self.mutate(|s| s.delete_routine(id)).await
    }
}

#[async_trait]
impl ReportStorage for FileBackend {
    async fn insert(&self, new: NewReport) -> StorageResult<SymptomReport> {
        self.mutate(|s| s.insert_report(new)).await
    }

    async fn update(&self, id: ReportId, new: NewReport) -> StorageResult<SymptomReport> {
        self.mutate(|s| s.update_report(id, new)).await
    }

    async fn find(
        &self,
        patient_id: PatientId,
        date: NaiveDate,
    ) -> StorageResult<Option<SymptomReport>> {
        Ok(self.state.read().await.find_report(patient_id, date))
    }

    async fn delete(&self, id: ReportId) -> StorageResult<()> {
        self.mutate(|s| s.delete_report(id)).await
    }

    async fn list_for_patient(&self, patient_id: PatientId) -> StorageResult<Vec<SymptomReport>> {
        Ok(self.state.read().await.list_reports(Some(patient_id)))
    }

    async fn list_all(&self) -> StorageResult<Vec<SymptomReport>> {
        Ok(self.state.read().await.list_reports(None))
    }
}
