//! Exercises and routines as authored by the clinician

use super::{Dosage, ExerciseId, RoutineId};
use crate::error::{common, ErrorCode, PlannerError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Tutorial media reference; storage and transcoding live elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    pub description: String,
    pub media: Option<MediaRef>,
}

/// One exercise slot inside a routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub exercise_id: ExerciseId,
    pub series: u32,
    pub dosage: Dosage,
    /// 1-based, contiguous within the routine
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: RoutineId,
    pub name: String,
    pub description: String,
    pub exercises: Vec<RoutineExercise>,
}

impl Routine {
    /// Exercises sorted by their `order` field
    pub fn ordered_exercises(&self) -> Vec<&RoutineExercise> {
        let mut exercises: Vec<_> = self.exercises.iter().collect();
        exercises.sort_by_key(|e| e.order);
        exercises
    }

    /// Drop one exercise and renumber the rest from 1
    ///
    /// Returns false when the exercise was not part of the routine.
    pub fn remove_exercise(&mut self, exercise_id: ExerciseId) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.exercise_id != exercise_id);
        if self.exercises.len() == before {
            return false;
        }
        self.exercises.sort_by_key(|e| e.order);
        for (index, entry) in self.exercises.iter_mut().enumerate() {
            entry.order = index as u32 + 1;
        }
        true
    }

    pub fn has_contiguous_order(&self) -> bool {
        self.ordered_exercises()
            .iter()
            .enumerate()
            .all(|(index, e)| e.order == index as u32 + 1)
    }
}

/// Create/edit payload; positions in `exercises` become the `order`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RoutineDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<DraftExercise>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DraftExercise {
    pub exercise_id: ExerciseId,
    pub series: u32,
    /// Free text such as "10 repeticiones"; parsed into a [`Dosage`]
    pub reps_or_duration: String,
}

impl RoutineDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_exercise(
        mut self,
        exercise_id: ExerciseId,
        series: u32,
        reps_or_duration: impl Into<String>,
    ) -> Self {
        self.exercises.push(DraftExercise {
            exercise_id,
            series,
            reps_or_duration: reps_or_duration.into(),
        });
        self
    }

    /// Validate the draft and turn it into ordered routine entries
    ///
    /// Checks shape only; whether the exercise ids exist is the catalog's job.
    pub fn into_parts(self) -> Result<(String, String, Vec<RoutineExercise>), PlannerError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(common::missing_required_field("name"));
        }

        let mut seen = HashSet::new();
        let mut exercises = Vec::with_capacity(self.exercises.len());
        for (index, draft) in self.exercises.into_iter().enumerate() {
            if !seen.insert(draft.exercise_id) {
                return Err(PlannerError::validation_with_code(
                    ErrorCode::VALIDATION_DUPLICATE_VALUE,
                    format!("exercise {} appears more than once", draft.exercise_id),
                    Some("exercises".to_string()),
                ));
            }
            if draft.series == 0 {
                return Err(PlannerError::validation_with_code(
                    ErrorCode::VALIDATION_OUT_OF_RANGE,
                    "series must be at least 1",
                    Some("series".to_string()),
                ));
            }
            exercises.push(RoutineExercise {
                exercise_id: draft.exercise_id,
                series: draft.series,
                dosage: Dosage::parse(&draft.reps_or_duration)?,
                order: index as u32 + 1,
            });
        }

        Ok((name, self.description, exercises))
    }
}
