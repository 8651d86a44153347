//! Calendar assignment service
//!
//! Binds routines to patients on calendar days. Eligibility is checked here so
//! callers get a precise error, and checked again by the store together with
//! the uniqueness constraint, which is what arbitrates concurrent requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{common, PlannerError, Result};
use crate::model::{
    Assignment, AssignmentId, CalendarEntry, DateSelector, PatientId, RoutineId,
};
use crate::storage::{NewAssignment, UnifiedStorage};

/// Assignment request as it arrives from a form; every field is required
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignRequest {
    pub patient_id: Option<PatientId>,
    pub routine_id: Option<RoutineId>,
    pub date: Option<NaiveDate>,
}

impl AssignRequest {
    pub fn validate(&self) -> Result<(PatientId, RoutineId, NaiveDate)> {
        let patient_id = self
            .patient_id
            .ok_or_else(|| common::missing_required_field("patient_id"))?;
        let routine_id = self
            .routine_id
            .ok_or_else(|| common::missing_required_field("routine_id"))?;
        let date = self.date.ok_or_else(|| common::missing_required_field("date"))?;
        Ok((patient_id, routine_id, date))
    }
}

#[derive(Clone)]
pub struct Scheduler {
    storage: Arc<dyn UnifiedStorage>,
}

impl Scheduler {
    pub fn new(storage: Arc<dyn UnifiedStorage>) -> Self {
        Self { storage }
    }

    /// Assign a routine to a patient on a date
    pub async fn assign(
        &self,
        patient_id: PatientId,
        routine_id: RoutineId,
        date: NaiveDate,
    ) -> Result<Assignment> {
        let patient = self
            .storage
            .patient_storage()
            .get(patient_id)
            .await?
            .ok_or_else(|| PlannerError::not_found("patient", format!("patient {}", patient_id)))?;
        if !patient.status.is_assignable() {
            return Err(common::patient_not_assignable(patient_id, patient.status.as_str()));
        }
        if self
            .storage
            .catalog_storage()
            .get_routine(routine_id)
            .await?
            .is_none()
        {
            return Err(PlannerError::not_found(
                "routine",
                format!("routine {}", routine_id),
            ));
        }

        let result = self
            .storage
            .assignment_storage()
            .create(NewAssignment {
                patient_id,
                routine_id,
                date,
            })
            .await;

        match result {
            Ok(assignment) => {
                info!(
                    "Assigned routine {} to patient {} on {} as {}",
                    routine_id, patient_id, date, assignment.id
                );
                Ok(assignment)
            }
            Err(e) => {
                if e.is_conflict() {
                    warn!(
                        "Routine {} already assigned to patient {} on {}",
                        routine_id, patient_id, date
                    );
                }
                Err(e.into())
            }
        }
    }

    /// Validate a form request and assign
    pub async fn assign_request(&self, request: &AssignRequest) -> Result<Assignment> {
        let (patient_id, routine_id, date) = request.validate()?;
        self.assign(patient_id, routine_id, date).await
    }

    /// Remove an assignment; an id that is already gone is `NotFound`
    pub async fn unassign(&self, assignment_id: AssignmentId) -> Result<()> {
        self.storage.assignment_storage().delete(assignment_id).await?;
        info!("Removed assignment {}", assignment_id);
        Ok(())
    }

    /// Every assignment for a patient, for the calendar dot view
    ///
    /// Unknown patients and patients with nothing scheduled both yield an
    /// empty list.
    pub async fn get_calendar(&self, patient_id: PatientId) -> Result<Vec<CalendarEntry>> {
        let assignments = self.assignments(patient_id, DateSelector::All).await?;
        let names: HashMap<RoutineId, String> = self
            .storage
            .catalog_storage()
            .list_routines()
            .await?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();

        let entries: Vec<CalendarEntry> = assignments
            .into_iter()
            .filter_map(|a| match names.get(&a.routine_id) {
                Some(name) => Some(CalendarEntry {
                    assignment_id: a.id,
                    date: a.date,
                    routine_name: name.clone(),
                }),
                None => {
                    warn!("Assignment {} references missing routine {}", a.id, a.routine_id);
                    None
                }
            })
            .collect();
        debug!("Calendar for patient {}: {} entries", patient_id, entries.len());
        Ok(entries)
    }

    /// Assignments for a patient over the given days, by date then creation order
    pub async fn assignments(
        &self,
        patient_id: PatientId,
        dates: DateSelector,
    ) -> Result<Vec<Assignment>> {
        Ok(self
            .storage
            .assignment_storage()
            .list(patient_id, dates)
            .await?)
    }

    /// Assignments for one day in creation order
    pub async fn assignments_on(
        &self,
        patient_id: PatientId,
        date: NaiveDate,
    ) -> Result<Vec<Assignment>> {
        self.assignments(patient_id, DateSelector::Day(date)).await
    }

    /// Days within the range that have at least one assignment
    pub async fn scheduled_days(
        &self,
        patient_id: PatientId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let mut days: Vec<NaiveDate> = self
            .assignments(patient_id, DateSelector::Range { from, to })
            .await?
            .into_iter()
            .map(|a| a.date)
            .collect();
        days.dedup();
        Ok(days)
    }
}
