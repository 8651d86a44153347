//! Execution session state machine
//!
//! The session is a plain value with no clock of its own: the caller feeds it
//! patient actions and one-second `tick`s. Everything time-related lives in
//! [`super::engine`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{common, ErrorCode, PlannerError, Result};
use crate::plan::{DailyPlan, PlannedExercise};

/// Rest between series of the same exercise
pub const DEFAULT_REST_SECONDS: u32 = 60;

/// Unique identifier for an execution session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(format!("session-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Screens the patient moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Welcome,
    ExerciseDetail,
    Executing,
    Resting,
    RoutineFinished,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::RoutineFinished)
    }
}

/// Who caused a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Patient,
    Timer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    /// Exercise index and series number after the transition
    pub exercise_index: usize,
    pub series_number: u32,
    pub trigger: Trigger,
}

/// One exercise of the flattened plan with the routine it came from
#[derive(Debug, Clone, PartialEq)]
struct Step {
    routine_name: String,
    exercise: PlannedExercise,
}

/// Read-only view for rendering the current screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionSnapshot {
    pub session_id: SessionId,
    pub phase: Phase,
    pub exercise_index: usize,
    pub exercise_count: usize,
    pub routine_name: Option<String>,
    pub exercise: Option<PlannedExercise>,
    pub series_number: u32,
    pub total_series: u32,
    /// Countdown for a timed series or for the rest period
    pub remaining_seconds: Option<u32>,
}

/// What a session amounted to when it was closed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub finished: bool,
    pub exercises_completed: usize,
    pub series_completed: u32,
    pub started_at: DateTime<Utc>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone)]
pub struct ExecutionSession {
    id: SessionId,
    steps: Vec<Step>,
    phase: Phase,
    exercise_index: usize,
    series_number: u32,
    remaining_seconds: Option<u32>,
    rest_seconds: u32,
    exercises_completed: usize,
    series_completed: u32,
    started_at: DateTime<Utc>,
    transitions: Vec<Transition>,
}

impl ExecutionSession {
    /// Snapshot the plan and wait at the welcome screen
    pub fn new(plan: &DailyPlan, rest_seconds: u32) -> Self {
        let steps = plan
            .routines
            .iter()
            .flat_map(|routine| {
                routine.exercises.iter().map(|exercise| Step {
                    routine_name: routine.routine_name.clone(),
                    exercise: exercise.clone(),
                })
            })
            .collect();
        Self {
            id: SessionId::new(),
            steps,
            phase: Phase::Welcome,
            exercise_index: 0,
            series_number: 0,
            remaining_seconds: None,
            rest_seconds,
            exercises_completed: 0,
            series_completed: 0,
            started_at: Utc::now(),
            transitions: Vec::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// True while a countdown is running, i.e. the session wants ticks
    pub fn is_ticking(&self) -> bool {
        match self.phase {
            Phase::Resting => true,
            Phase::Executing => self.remaining_seconds.is_some(),
            _ => false,
        }
    }

    /// Welcome → ExerciseDetail, or straight to RoutineFinished for an empty plan
    pub fn start_routine(&mut self) -> Result<Phase> {
        if self.phase != Phase::Welcome {
            return Err(common::invalid_transition("start routine", self.phase));
        }
        self.exercise_index = 0;
        if self.steps.is_empty() {
            self.series_number = 0;
            self.enter(Phase::RoutineFinished, Trigger::Patient);
        } else {
            self.enter_detail(Trigger::Patient);
        }
        Ok(self.phase)
    }

    /// ExerciseDetail → Executing, first series
    pub fn begin_exercise(&mut self) -> Result<Phase> {
        if self.phase != Phase::ExerciseDetail {
            return Err(common::invalid_transition("begin exercise", self.phase));
        }
        self.series_number = 1;
        self.remaining_seconds = self.current_step()?.exercise.dosage.duration_seconds();
        self.enter(Phase::Executing, Trigger::Patient);
        Ok(self.phase)
    }

    /// Mark the current series done; allowed for timed series too
    pub fn complete_series(&mut self) -> Result<Phase> {
        if self.phase != Phase::Executing {
            return Err(common::invalid_transition("complete series", self.phase));
        }
        self.finish_series(Trigger::Patient)?;
        Ok(self.phase)
    }

    /// Advance the running countdown by one second
    ///
    /// Returns the new phase when the countdown ran out. A tick while no
    /// countdown is running means a timer outlived its state.
    pub fn tick(&mut self) -> Result<Option<Phase>> {
        if !self.is_ticking() {
            return Err(PlannerError::timer_integrity(format!(
                "tick received while {:?} in {}",
                self.phase, self.id
            )));
        }
        let remaining = self.remaining_seconds.unwrap_or(0).saturating_sub(1);
        self.remaining_seconds = Some(remaining);
        if remaining > 0 {
            return Ok(None);
        }

        if self.phase == Phase::Resting {
            // rest never advances the exercise index
            self.remaining_seconds = self.current_step()?.exercise.dosage.duration_seconds();
            self.enter(Phase::Executing, Trigger::Timer);
        } else {
            self.finish_series(Trigger::Timer)?;
        }
        Ok(Some(self.phase))
    }

    pub fn snapshot(&self) -> ExecutionSnapshot {
        let step = match self.phase {
            Phase::Welcome | Phase::RoutineFinished => None,
            _ => self.steps.get(self.exercise_index),
        };
        ExecutionSnapshot {
            session_id: self.id.clone(),
            phase: self.phase,
            exercise_index: self.exercise_index,
            exercise_count: self.steps.len(),
            routine_name: step.map(|s| s.routine_name.clone()),
            exercise: step.map(|s| s.exercise.clone()),
            series_number: self.series_number,
            total_series: step.map(|s| s.exercise.series).unwrap_or(0),
            remaining_seconds: self.remaining_seconds,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            finished: self.phase.is_terminal(),
            exercises_completed: self.exercises_completed,
            series_completed: self.series_completed,
            started_at: self.started_at,
            transitions: self.transitions.clone(),
        }
    }

    fn current_step(&self) -> Result<&Step> {
        self.steps.get(self.exercise_index).ok_or_else(|| {
            PlannerError::execution_with_code(
                ErrorCode::EXEC_GENERIC,
                format!("exercise index {} outside plan", self.exercise_index),
            )
        })
    }

    /// Shared branch for manual completion and an expired timed series
    fn finish_series(&mut self, trigger: Trigger) -> Result<()> {
        let total_series = self.current_step()?.exercise.series;
        self.series_completed += 1;

        if self.series_number < total_series {
            self.series_number += 1;
            if self.rest_seconds == 0 {
                self.remaining_seconds = self.current_step()?.exercise.dosage.duration_seconds();
                self.enter(Phase::Executing, trigger);
            } else {
                self.remaining_seconds = Some(self.rest_seconds);
                self.enter(Phase::Resting, trigger);
            }
            return Ok(());
        }

        self.exercises_completed += 1;
        if self.exercise_index + 1 >= self.steps.len() {
            self.remaining_seconds = None;
            self.enter(Phase::RoutineFinished, trigger);
        } else {
            self.exercise_index += 1;
            self.enter_detail(trigger);
        }
        Ok(())
    }

    /// Every entry into the detail screen starts the exercise from scratch
    fn enter_detail(&mut self, trigger: Trigger) {
        self.series_number = 1;
        self.remaining_seconds = None;
        self.enter(Phase::ExerciseDetail, trigger);
    }

    fn enter(&mut self, to: Phase, trigger: Trigger) {
        let from = self.phase;
        self.phase = to;
        debug!(
            "{}: {:?} -> {:?} (exercise {}, series {}, {:?})",
            self.id, from, to, self.exercise_index, self.series_number, trigger
        );
        self.transitions.push(Transition {
            from,
            to,
            exercise_index: self.exercise_index,
            series_number: self.series_number,
            trigger,
        });
    }
}
