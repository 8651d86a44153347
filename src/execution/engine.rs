//! Async driver for an execution session
//!
//! Owns the session and at most one countdown timer. Every transition replaces
//! the timer: the old task is aborted before a new one is spawned, and leaving
//! the ticking phases releases it entirely.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::session::{
    ExecutionSession, ExecutionSnapshot, Phase, SessionSummary, Transition, DEFAULT_REST_SECONDS,
};
use super::timer::{SharedState, TimerGuard};
use crate::error::{common, ErrorCode, PlannerError, Result};
use crate::plan::DailyPlan;

#[derive(Debug, Default)]
pub(crate) struct EngineState {
    session: Option<ExecutionSession>,
    timer: Option<TimerGuard>,
    /// Bumped whenever the timer is replaced; a tick carrying an older epoch is stale
    epoch: u64,
    integrity_violations: u64,
}

impl EngineState {
    fn session_mut(&mut self) -> Result<&mut ExecutionSession> {
        self.session.as_mut().ok_or_else(no_session)
    }

    /// Make the timer match the session after a transition
    fn reconcile_timer(&mut self, shared: &SharedState) {
        self.epoch += 1;
        self.timer = None;
        if self.session.as_ref().is_some_and(|s| s.is_ticking()) {
            self.timer = Some(TimerGuard::spawn(Arc::downgrade(shared), self.epoch));
        }
    }

    /// Tear down the session and its timer
    fn close(&mut self) -> Option<ExecutionSession> {
        self.epoch += 1;
        self.timer = None;
        self.session.take()
    }

    fn record_violation(&mut self, err: &PlannerError) {
        self.integrity_violations += 1;
        error!("{}", err);
    }

    /// Handle one timer tick; returns whether the timer should keep running
    pub(crate) fn on_tick(&mut self, shared: &SharedState, epoch: u64) -> bool {
        if epoch != self.epoch {
            self.record_violation(&PlannerError::timer_integrity(format!(
                "stale timer tick (epoch {}, current {})",
                epoch, self.epoch
            )));
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            self.record_violation(&PlannerError::timer_integrity("tick with no open session"));
            self.timer = None;
            return false;
        };
        match session.tick() {
            Ok(None) => true,
            Ok(Some(_)) => {
                self.reconcile_timer(shared);
                false
            }
            Err(e) => {
                self.record_violation(&e);
                self.timer = None;
                false
            }
        }
    }
}

/// Drives one patient through a daily plan
///
/// Not `Clone`: the engine belongs to whoever renders the session, and
/// dropping it cancels any running countdown.
#[derive(Debug)]
pub struct ExecutionEngine {
    state: SharedState,
    rest_seconds: u32,
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new(Duration::from_secs(u64::from(DEFAULT_REST_SECONDS)))
    }
}

impl ExecutionEngine {
    pub fn new(rest_interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState::default())),
            rest_seconds: u32::try_from(rest_interval.as_secs()).unwrap_or(u32::MAX),
        }
    }

    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    /// Open a session on the welcome screen, replacing any previous one
    pub async fn open(&self, plan: &DailyPlan) -> ExecutionSnapshot {
        let mut state = self.state.lock().await;
        if let Some(previous) = state.close() {
            debug!("Replacing execution session {}", previous.id());
        }
        let session = ExecutionSession::new(plan, self.rest_seconds);
        info!(
            "Opened execution session {} with {} exercises",
            session.id(),
            plan.total_exercises()
        );
        let snapshot = session.snapshot();
        state.session = Some(session);
        snapshot
    }

    /// Open a session and move past the welcome screen
    ///
    /// An empty plan lands directly on RoutineFinished.
    pub async fn start(&self, plan: &DailyPlan) -> Result<ExecutionSnapshot> {
        self.open(plan).await;
        self.start_routine().await
    }

    pub async fn start_routine(&self) -> Result<ExecutionSnapshot> {
        self.apply(|session| session.start_routine()).await
    }

    pub async fn begin_exercise(&self) -> Result<ExecutionSnapshot> {
        self.apply(|session| session.begin_exercise()).await
    }

    pub async fn complete_series(&self) -> Result<ExecutionSnapshot> {
        self.apply(|session| session.complete_series()).await
    }

    /// Leave for the routine list, discarding all progress
    pub async fn go_back(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let phase = state.session_mut()?.phase();
        if phase.is_terminal() {
            return Err(common::invalid_transition("go back", phase));
        }
        if let Some(session) = state.close() {
            info!("Abandoned execution session {} from {:?}", session.id(), phase);
        }
        Ok(())
    }

    /// Close the session from any phase and report what was done
    pub async fn finish(&self) -> Result<SessionSummary> {
        let mut state = self.state.lock().await;
        let session = state.close().ok_or_else(no_session)?;
        let summary = session.summary();
        info!(
            "Closed execution session {} (finished: {}, {} series)",
            summary.session_id, summary.finished, summary.series_completed
        );
        Ok(summary)
    }

    pub async fn current_state(&self) -> Option<ExecutionSnapshot> {
        self.state.lock().await.session.as_ref().map(|s| s.snapshot())
    }

    /// Transition log of the open session
    pub async fn transitions(&self) -> Vec<Transition> {
        self.state
            .lock()
            .await
            .session
            .as_ref()
            .map(|s| s.transitions().to_vec())
            .unwrap_or_default()
    }

    /// Ticks that arrived without a ticking state; always zero unless broken
    pub async fn integrity_violations(&self) -> u64 {
        self.state.lock().await.integrity_violations
    }

    /// Whether a countdown task currently exists
    pub async fn timer_active(&self) -> bool {
        self.state.lock().await.timer.is_some()
    }

    async fn apply<F>(&self, action: F) -> Result<ExecutionSnapshot>
    where
        F: FnOnce(&mut ExecutionSession) -> Result<Phase>,
    {
        let mut state = self.state.lock().await;
        let session = state.session_mut()?;
        action(session)?;
        let snapshot = session.snapshot();
        // every accepted action is a transition, even Executing to Executing
        state.reconcile_timer(&self.state);
        Ok(snapshot)
    }
}

fn no_session() -> PlannerError {
    PlannerError::execution_with_code(ErrorCode::EXEC_SESSION_CLOSED, "no execution session is open")
}
