//! Table state shared by the in-process backends
//!
//! Backends wrap a [`StorageState`] in a write lock, so every method here runs
//! as one atomic unit. Constraint checks and the mutation they guard are never
//! split across two lock acquisitions.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{StorageError, StorageResult};
use super::types::*;
use crate::model::{
    Assignment, AssignmentId, DateSelector, Exercise, ExerciseId, Patient, PatientId,
    PatientStatus, ReportId, Routine, RoutineId, SymptomReport,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StorageState {
    next_id: u64,
    patients: BTreeMap<PatientId, Patient>,
    exercises: BTreeMap<ExerciseId, Exercise>,
    routines: BTreeMap<RoutineId, Routine>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    reports: BTreeMap<ReportId, SymptomReport>,
}

impl StorageState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn health(&self, backend_type: &str) -> HealthStatus {
        HealthStatus {
            healthy: true,
            backend_type: backend_type.to_string(),
            assignments: self.assignments.len(),
            routines: self.routines.len(),
            patients: self.patients.len(),
        }
    }

    // Assignments

    pub fn create_assignment(&mut self, new: NewAssignment) -> StorageResult<Assignment> {
        match self.patients.get(&new.patient_id) {
            Some(p) if p.status.is_assignable() => {}
            Some(p) => {
                return Err(StorageError::not_found(
                    "patient",
                    format!("{} ({})", p.id, p.status.as_str()),
                ))
            }
            None => return Err(StorageError::not_found("patient", new.patient_id)),
        }
        if !self.routines.contains_key(&new.routine_id) {
            return Err(StorageError::not_found("routine", new.routine_id));
        }

        let duplicate = self.assignments.values().any(|a| {
            a.patient_id == new.patient_id && a.routine_id == new.routine_id && a.date == new.date
        });
        if duplicate {
            return Err(StorageError::conflict(
                "assignment_triple",
                format!("patient {} routine {} on {}", new.patient_id, new.routine_id, new.date),
            ));
        }

        let assignment = Assignment {
            id: AssignmentId(self.allocate_id()),
            patient_id: new.patient_id,
            routine_id: new.routine_id,
            date: new.date,
        };
        self.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    pub fn delete_assignment(&mut self, id: AssignmentId) -> StorageResult<()> {
        self.assignments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("assignment", id))
    }

    pub fn get_assignment(&self, id: AssignmentId) -> Option<Assignment> {
        self.assignments.get(&id).cloned()
    }

    pub fn list_assignments(&self, patient_id: PatientId, dates: DateSelector) -> Vec<Assignment> {
        let mut rows: Vec<Assignment> = self
            .assignments
            .values()
            .filter(|a| a.patient_id == patient_id && dates.contains(a.date))
            .cloned()
            .collect();
        // ids are allocated monotonically, so they double as insertion order
        rows.sort_by_key(|a| (a.date, a.id));
        rows
    }

    // Patients

    pub fn insert_patient(&mut self, new: NewPatient) -> StorageResult<Patient> {
        let email = new.email.trim().to_lowercase();
        if self.patients.values().any(|p| p.email == email) {
            return Err(StorageError::conflict("patient_email", email));
        }
        let patient = Patient {
            id: PatientId(self.allocate_id()),
            full_name: new.full_name.trim().to_string(),
            email,
            status: new.status,
        };
        self.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    pub fn get_patient(&self, id: PatientId) -> Option<Patient> {
        self.patients.get(&id).cloned()
    }

    pub fn list_patients(&self) -> Vec<Patient> {
        self.patients.values().cloned().collect()
    }

    pub fn set_patient_status(
        &mut self,
        id: PatientId,
        status: PatientStatus,
    ) -> StorageResult<Patient> {
        let patient = self
            .patients
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("patient", id))?;
        patient.status = status;
        Ok(patient.clone())
    }

    pub fn delete_patient(&mut self, id: PatientId) -> StorageResult<()> {
        self.patients
            .remove(&id)
            .ok_or_else(|| StorageError::not_found("patient", id))?;
        self.assignments.retain(|_, a| a.patient_id != id);
        self.reports.retain(|_, r| r.patient_id != id);
        Ok(())
    }

    // Catalog

    pub fn insert_exercise(&mut self, new: NewExercise) -> StorageResult<Exercise> {
        let name = new.name.trim().to_string();
        if self
            .exercises
            .values()
            .any(|e| same_name(&e.name, &name))
        {
            return Err(StorageError::conflict("exercise_name", name));
        }
        let exercise = Exercise {
            id: ExerciseId(self.allocate_id()),
            name,
            description: new.description,
            media: new.media,
        };
        self.exercises.insert(exercise.id, exercise.clone());
        Ok(exercise)
    }

    pub fn get_exercise(&self, id: ExerciseId) -> Option<Exercise> {
        self.exercises.get(&id).cloned()
    }

    pub fn list_exercises(&self) -> Vec<Exercise> {
        self.exercises.values().cloned().collect()
    }

    fn check_routine(&self, new: &NewRoutine, skip: Option<RoutineId>) -> StorageResult<()> {
        let name_taken = self
            .routines
            .values()
            .any(|r| Some(r.id) != skip && same_name(&r.name, &new.name));
        if name_taken {
            return Err(StorageError::conflict("routine_name", &new.name));
        }
        if let Some(missing) = new
            .exercises
            .iter()
            .find(|e| !self.exercises.contains_key(&e.exercise_id))
        {
            return Err(StorageError::not_found("exercise", missing.exercise_id));
        }
        Ok(())
    }

    pub fn insert_routine(&mut self, new: NewRoutine) -> StorageResult<Routine> {
        self.check_routine(&new, None)?;
        let routine = Routine {
            id: RoutineId(self.allocate_id()),
            name: new.name,
            description: new.description,
            exercises: new.exercises,
        };
        self.routines.insert(routine.id, routine.clone());
        Ok(routine)
    }

    pub fn get_routine(&self, id: RoutineId) -> Option<Routine> {
        self.routines.get(&id).cloned()
    }

    pub fn list_routines(&self) -> Vec<Routine> {
        self.routines.values().cloned().collect()
    }

    pub fn replace_routine(&mut self, id: RoutineId, new: NewRoutine) -> StorageResult<Routine> {
        if !self.routines.contains_key(&id) {
            return Err(StorageError::not_found("routine", id));
        }
        self.check_routine(&new, Some(id))?;
        let routine = Routine {
            id,
            name: new.name,
            description: new.description,
            exercises: new.exercises,
        };
        self.routines.insert(id, routine.clone());
        Ok(routine)
    }

    pub fn remove_routine_exercise(
        &mut self,
        id: RoutineId,
        exercise_id: ExerciseId,
    ) -> StorageResult<Routine> {
        let routine = self
            .routines
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("routine", id))?;
        if !routine.remove_exercise(exercise_id) {
            return Err(StorageError::not_found(
                "routine_exercise",
                format!("exercise {} in routine {}", exercise_id, id),
            ));
        }
        Ok(routine.clone())
    }

    pub fn delete_routine(&mut self, id: RoutineId) -> StorageResult<usize> {
        self.routines
            .remove(&id)
            .ok_or_else(|| StorageError::not_found("routine", id))?;
        let before = self.assignments.len();
        self.assignments.retain(|_, a| a.routine_id != id);
        Ok(before - self.assignments.len())
    }

    // Reports

    pub fn insert_report(&mut self, new: NewReport) -> StorageResult<SymptomReport> {
        if self.find_report(new.patient_id, new.date).is_some() {
            return Err(StorageError::conflict(
                "report_per_day",
                format!("patient {} on {}", new.patient_id, new.date),
            ));
        }
        if !self.patients.contains_key(&new.patient_id) {
            return Err(StorageError::not_found("patient", new.patient_id));
        }
        let report = SymptomReport {
            id: ReportId(self.allocate_id()),
            patient_id: new.patient_id,
            date: new.date,
            symptoms: new.symptoms,
            comment: new.comment,
            updated_at: Utc::now(),
        };
        self.reports.insert(report.id, report.clone());
        Ok(report)
    }

    pub fn update_report(&mut self, id: ReportId, new: NewReport) -> StorageResult<SymptomReport> {
        let report = self
            .reports
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("report", id))?;
        report.symptoms = new.symptoms;
        report.comment = new.comment;
        report.updated_at = Utc::now();
        Ok(report.clone())
    }

    pub fn find_report(&self, patient_id: PatientId, date: NaiveDate) -> Option<SymptomReport> {
        self.reports
            .values()
            .find(|r| r.patient_id == patient_id && r.date == date)
            .cloned()
    }

    pub fn delete_report(&mut self, id: ReportId) -> StorageResult<()> {
        self.reports
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("report", id))
    }

    pub fn list_reports(&self, patient_id: Option<PatientId>) -> Vec<SymptomReport> {
        let mut rows: Vec<SymptomReport> = self
            .reports
            .values()
            .filter(|r| patient_id.map_or(true, |p| r.patient_id == p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        rows
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
