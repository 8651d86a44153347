//! Patient directory
//!
//! Registration and approval belong to user management; this is the slice
//! of it the scheduler needs: who exists, and who may receive routines.

use std::sync::Arc;
use tracing::info;

use crate::error::{common, PlannerError, Result};
use crate::model::{Patient, PatientId, PatientStatus};
use crate::storage::{NewPatient, UnifiedStorage};

#[derive(Clone)]
pub struct PatientDirectory {
    storage: Arc<dyn UnifiedStorage>,
}

impl PatientDirectory {
    pub fn new(storage: Arc<dyn UnifiedStorage>) -> Self {
        Self { storage }
    }

    /// Register a patient; new accounts wait for approval
    pub async fn register_patient(&self, full_name: &str, email: &str) -> Result<Patient> {
        if full_name.trim().is_empty() {
            return Err(common::missing_required_field("full_name"));
        }
        if !email.contains('@') {
            return Err(PlannerError::validation_with_code(
                crate::error::ErrorCode::VALIDATION_INVALID_FORMAT,
                "email address is malformed",
                Some("email".to_string()),
            ));
        }
        let patient = self
            .storage
            .patient_storage()
            .insert(NewPatient {
                full_name: full_name.to_string(),
                email: email.to_string(),
                status: PatientStatus::Pending,
            })
            .await?;
        info!("Registered patient {} (pending approval)", patient.id);
        Ok(patient)
    }

    pub async fn approve(&self, id: PatientId) -> Result<Patient> {
        self.set_status(id, PatientStatus::Active).await
    }

    pub async fn deactivate(&self, id: PatientId) -> Result<Patient> {
        self.set_status(id, PatientStatus::Inactive).await
    }

    pub async fn set_status(&self, id: PatientId, status: PatientStatus) -> Result<Patient> {
        let patient = self.storage.patient_storage().set_status(id, status).await?;
        info!("Patient {} is now {}", id, status.as_str());
        Ok(patient)
    }

    pub async fn get_patient(&self, id: PatientId) -> Result<Patient> {
        self.storage
            .patient_storage()
            .get(id)
            .await?
            .ok_or_else(|| PlannerError::not_found("patient", format!("patient {}", id)))
    }

    /// Active patients ordered by name, for the assignment picker
    pub async fn assignable_patients(&self) -> Result<Vec<Patient>> {
        let mut patients: Vec<Patient> = self
            .storage
            .patient_storage()
            .list()
            .await?
            .into_iter()
            .filter(|p| p.status.is_assignable())
            .collect();
        patients.sort_by(|a, b| a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()));
        Ok(patients)
    }

    pub async fn pending_patients(&self) -> Result<Vec<Patient>> {
        Ok(self
            .storage
            .patient_storage()
            .list()
            .await?
            .into_iter()
            .filter(|p| p.status == PatientStatus::Pending)
            .collect())
    }

    /// Remove a patient together with their assignments and reports
    pub async fn delete_patient(&self, id: PatientId) -> Result<()> {
        self.storage.patient_storage().delete(id).await?;
        info!("Deleted patient {} and cascaded their records", id);
        Ok(())
    }
}
