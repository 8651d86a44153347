//! Guided execution of a daily plan
//!
//! [`ExecutionSession`] is the pure state machine
//! (`Welcome → ExerciseDetail → Executing → Resting → … → RoutineFinished`);
//! [`ExecutionEngine`] wraps it with the one-second countdown for timed
//! series and rest periods. Sessions live only in memory and are discarded
//! on back or finish.

pub mod engine;
pub mod session;
pub mod timer;

pub use engine::ExecutionEngine;
pub use session::{
    ExecutionSession, ExecutionSnapshot, Phase, SessionId, SessionSummary, Transition, Trigger,
    DEFAULT_REST_SECONDS,
};
pub use timer::{TimerGuard, TICK};

#[cfg(test)]
mod tests;
