//! Daily plan resolution
//!
//! Turns "what is assigned to this patient today" into "what the patient
//! does today": one group per assigned routine, in assignment creation order,
//! each holding its exercises in routine order. Nothing is cached; every call
//! reflects the current routines and assignments.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{Dosage, ExerciseId, MediaRef, PatientId, RoutineId};
use crate::scheduler::Scheduler;
use crate::storage::UnifiedStorage;

/// One exercise as the patient will perform it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub exercise_id: ExerciseId,
    pub name: String,
    pub description: String,
    pub media: Option<MediaRef>,
    pub series: u32,
    pub dosage: Dosage,
    /// Display form of the dosage, e.g. "30 segundos"
    pub reps_or_duration: String,
}

impl PlannedExercise {
    pub fn new(
        exercise_id: ExerciseId,
        name: impl Into<String>,
        series: u32,
        dosage: Dosage,
    ) -> Self {
        Self {
            exercise_id,
            name: name.into(),
            description: String::new(),
            media: None,
            series,
            dosage,
            reps_or_duration: dosage.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoutine {
    pub routine_id: RoutineId,
    pub routine_name: String,
    pub exercises: Vec<PlannedExercise>,
}

/// Resolved plan for one patient and day; never persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyPlan {
    pub routines: Vec<PlannedRoutine>,
}

impl DailyPlan {
    pub fn new(routines: Vec<PlannedRoutine>) -> Self {
        Self { routines }
    }

    /// A single-routine plan, handy for previews and tests
    pub fn single(name: impl Into<String>, exercises: Vec<PlannedExercise>) -> Self {
        Self::new(vec![PlannedRoutine {
            routine_id: RoutineId(0),
            routine_name: name.into(),
            exercises,
        }])
    }

    /// Every exercise across all routines, in execution order
    pub fn exercises(&self) -> impl Iterator<Item = &PlannedExercise> {
        self.routines.iter().flat_map(|r| r.exercises.iter())
    }

    pub fn total_exercises(&self) -> usize {
        self.routines.iter().map(|r| r.exercises.len()).sum()
    }

    /// True when there is nothing to perform, even if routines are present
    pub fn is_empty(&self) -> bool {
        self.total_exercises() == 0
    }
}

#[derive(Clone)]
pub struct DailyPlanResolver {
    scheduler: Scheduler,
    storage: Arc<dyn UnifiedStorage>,
}

impl DailyPlanResolver {
    pub fn new(scheduler: Scheduler, storage: Arc<dyn UnifiedStorage>) -> Self {
        Self { scheduler, storage }
    }

    /// Plan for the local calendar day
    pub async fn resolve_today(&self, patient_id: PatientId) -> Result<DailyPlan> {
        self.resolve(patient_id, Local::now().date_naive()).await
    }

    /// Plan for a given day
    ///
    /// A routine edited down to zero exercises still appears, with an empty
    /// exercise list. Routines or exercises deleted between the assignment
    /// listing and the lookup are skipped.
    pub async fn resolve(&self, patient_id: PatientId, date: NaiveDate) -> Result<DailyPlan> {
        let assignments = self.scheduler.assignments_on(patient_id, date).await?;
        let catalog = self.storage.catalog_storage();

        let mut routines = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let Some(routine) = catalog.get_routine(assignment.routine_id).await? else {
                warn!(
                    "Assignment {} points at deleted routine {}",
                    assignment.id, assignment.routine_id
                );
                continue;
            };

            let mut exercises = Vec::with_capacity(routine.exercises.len());
            for entry in routine.ordered_exercises() {
                match catalog.get_exercise(entry.exercise_id).await? {
                    Some(exercise) => exercises.push(PlannedExercise {
                        exercise_id: exercise.id,
                        name: exercise.name,
                        description: exercise.description,
                        media: exercise.media,
                        series: entry.series,
                        dosage: entry.dosage,
                        reps_or_duration: entry.dosage.to_string(),
                    }),
                    None => warn!(
                        "Routine {} references missing exercise {}",
                        routine.id, entry.exercise_id
                    ),
                }
            }

            routines.push(PlannedRoutine {
                routine_id: routine.id,
                routine_name: routine.name,
                exercises,
            });
        }

        let plan = DailyPlan::new(routines);
        debug!(
            "Resolved plan for patient {} on {}: {} routines, {} exercises",
            patient_id,
            date,
            plan.routines.len(),
            plan.total_exercises()
        );
        Ok(plan)
    }
}
