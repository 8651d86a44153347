//! Exercise and routine authoring
//!
//! Routines are edited as a whole: an update rewrites name, description and
//! the complete exercise list in one storage call.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{common, PlannerError, Result};
use crate::model::{
    Exercise, ExerciseId, MediaRef, Routine, RoutineDraft, RoutineExercise, RoutineId,
};
use crate::storage::{NewExercise, NewRoutine, UnifiedStorage};

/// Routine listing row for pickers
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RoutineSummary {
    pub id: RoutineId,
    pub name: String,
}

#[derive(Clone)]
pub struct Catalog {
    storage: Arc<dyn UnifiedStorage>,
}

impl Catalog {
    pub fn new(storage: Arc<dyn UnifiedStorage>) -> Self {
        Self { storage }
    }

    pub async fn create_exercise(
        &self,
        name: &str,
        description: &str,
        media: Option<MediaRef>,
    ) -> Result<Exercise> {
        if name.trim().is_empty() {
            return Err(common::missing_required_field("name"));
        }
        let exercise = self
            .storage
            .catalog_storage()
            .insert_exercise(NewExercise {
                name: name.to_string(),
                description: description.to_string(),
                media,
            })
            .await?;
        info!("Created exercise {} '{}'", exercise.id, exercise.name);
        Ok(exercise)
    }

    pub async fn get_exercise(&self, id: ExerciseId) -> Result<Exercise> {
        self.storage
            .catalog_storage()
            .get_exercise(id)
            .await?
            .ok_or_else(|| PlannerError::not_found("exercise", format!("exercise {}", id)))
    }

    pub async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        Ok(self.storage.catalog_storage().list_exercises().await?)
    }

    pub async fn create_routine(&self, draft: RoutineDraft) -> Result<Routine> {
        let (name, description, exercises) = draft.into_parts()?;
        let routine = self
            .storage
            .catalog_storage()
            .insert_routine(NewRoutine {
                name,
                description,
                exercises,
            })
            .await?;
        info!(
            "Created routine {} '{}' with {} exercises",
            routine.id,
            routine.name,
            routine.exercises.len()
        );
        Ok(routine)
    }

    /// Replace a routine's definition; assignments keep pointing at it
    pub async fn update_routine(&self, id: RoutineId, draft: RoutineDraft) -> Result<Routine> {
        let (name, description, exercises) = draft.into_parts()?;
        let routine = self
            .storage
            .catalog_storage()
            .replace_routine(
                id,
                NewRoutine {
                    name,
                    description,
                    exercises,
                },
            )
            .await?;
        info!("Updated routine {} ({} exercises)", id, routine.exercises.len());
        Ok(routine)
    }

    /// Remove one exercise from a routine and renumber the remaining ones
    pub async fn remove_exercise_from_routine(
        &self,
        routine_id: RoutineId,
        exercise_id: ExerciseId,
    ) -> Result<Routine> {
        let updated = self
            .storage
            .catalog_storage()
            .remove_routine_exercise(routine_id, exercise_id)
            .await?;
        debug!(
            "Removed exercise {} from routine {}, {} left",
            exercise_id,
            routine_id,
            updated.exercises.len()
        );
        Ok(updated)
    }

    /// Delete a routine; its assignments go with it
    pub async fn delete_routine(&self, id: RoutineId) -> Result<()> {
        let cascaded = self.storage.catalog_storage().delete_routine(id).await?;
        info!("Deleted routine {} and {} assignments", id, cascaded);
        Ok(())
    }

    pub async fn get_routine(&self, id: RoutineId) -> Result<Routine> {
        self.storage
            .catalog_storage()
            .get_routine(id)
            .await?
            .ok_or_else(|| PlannerError::not_found("routine", format!("routine {}", id)))
    }

    /// All routines by name
    pub async fn list_routines(&self) -> Result<Vec<RoutineSummary>> {
        let mut routines: Vec<RoutineSummary> = self
            .storage
            .catalog_storage()
            .list_routines()
            .await?
            .into_iter()
            .map(|r| RoutineSummary {
                id: r.id,
                name: r.name,
            })
            .collect();
        routines.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(routines)
    }

    /// A routine's exercises joined with their definitions, in `order`
    pub async fn routine_exercises(&self, id: RoutineId) -> Result<Vec<(RoutineExercise, Exercise)>> {
        let routine = self.get_routine(id).await?;
        let mut rows = Vec::with_capacity(routine.exercises.len());
        for entry in routine.ordered_exercises() {
            let exercise = self.get_exercise(entry.exercise_id).await?;
            rows.push((entry.clone(), exercise));
        }
        Ok(rows)
    }
}
