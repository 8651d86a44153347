//! Countdown timer ownership

use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

use super::engine::EngineState;

/// Countdown resolution
pub const TICK: Duration = Duration::from_secs(1);

/// The one running countdown task; dropping the guard aborts it
#[derive(Debug)]
pub struct TimerGuard {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl TimerGuard {
    /// Start ticking once per second, first tick one second from now
    ///
    /// The task holds only a weak reference so an abandoned engine tears
    /// its timer down with it.
    pub(crate) fn spawn(state: Weak<Mutex<EngineState>>, epoch: u64) -> Self {
        trace!("Starting countdown timer (epoch {})", epoch);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(shared) = state.upgrade() else {
                    return;
                };
                let mut guard = shared.lock().await;
                if !guard.on_tick(&shared, epoch) {
                    return;
                }
            }
        });
        Self { epoch, handle }
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.abort();
        trace!("Cancelled countdown timer (epoch {})", self.epoch);
    }
}

/// Shared handle type used by the engine and its timer
pub(crate) type SharedState = Arc<Mutex<EngineState>>;
