//! Countdown state machine
//!
//! ```text
//! Idle --start--> Running --tick (remaining hits 0)--> Finished --> Idle
//!   ^                |
//!   +---stop/reset---+
//! ```
//!
//! `Finished` is never observable: the alert is raised and the controller is
//! back in `Idle` with `elapsed == duration` before the tick returns.

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::scheduler::{PeriodicScheduler, TimerHandle};
use crate::{
    services::{DurationStore, NotificationPresenter, TIMER_VALUE_KEY},
    state::{timer_state::remaining_seconds, TimerPhase, TimerState},
    utils::Locale,
};

/// Interval between ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the countdown and its single tick registration
pub struct CountdownController<S, D, P>
where
    S: PeriodicScheduler,
    D: DurationStore,
    P: NotificationPresenter,
{
    scheduler: S,
    store: D,
    presenter: P,
    locale: Locale,
    duration: i64,
    elapsed: i64,
    handle: Option<TimerHandle>,
    completions: u64,
    state_tx: watch::Sender<TimerState>,
}

impl<S, D, P> CountdownController<S, D, P>
where
    S: PeriodicScheduler,
    D: DurationStore,
    P: NotificationPresenter,
{
    pub fn new(scheduler: S, store: D, presenter: P, locale: Locale) -> Self {
        let duration = store.timer_value();
        let (state_tx, _) = watch::channel(TimerState::idle(duration));

        Self {
            scheduler,
            store,
            presenter,
            locale,
            duration,
            elapsed: 0,
            handle: None,
            completions: 0,
            state_tx,
        }
    }

    /// Watch the published state
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> TimerState {
        TimerState {
            phase: if self.is_running() { TimerPhase::Running } else { TimerPhase::Idle },
            duration_seconds: self.duration,
            elapsed_seconds: self.elapsed,
            remaining_seconds: self.remaining(),
            timer_value: self.store.timer_value(),
            completions: self.completions,
        }
    }

    pub fn remaining(&self) -> u64 {
        remaining_seconds(self.duration, self.elapsed)
    }

    pub fn elapsed(&self) -> i64 {
        self.elapsed
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .map(|handle| self.scheduler.is_active(handle))
            .unwrap_or(false)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Begin (or resume) the countdown
    pub fn start(&mut self) -> TimerState {
        if self.is_running() {
            debug!("Start ignored, countdown already running");
            return self.snapshot();
        }

        self.duration = self.store.timer_value();
        if self.remaining() == 0 {
            self.elapsed = 0;
        }

        self.handle = Some(self.scheduler.register(TICK_INTERVAL));
        info!("Countdown started: {}s of {}s remaining", self.remaining(), self.duration);
        self.publish()
    }

    /// Deliver a scheduler firing. Ticks from a handle that is no longer the
    /// active one are dropped.
    pub fn on_tick(&mut self, handle: TimerHandle) -> TimerState {
        if self.handle != Some(handle) || !self.scheduler.is_active(handle) {
            debug!("Ignoring stale tick from registration {}", handle.id());
            return self.snapshot();
        }

        self.tick();
        self.publish()
    }

    fn tick(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
        debug!("Tick: elapsed={}s remaining={}s", self.elapsed, self.remaining());

        if self.remaining() == 0 {
            self.finish();
        }
    }

    /// Pause the countdown, keeping elapsed time
    pub fn stop(&mut self) -> TimerState {
        if self.cancel_handle() {
            info!("Countdown stopped with {}s remaining", self.remaining());
        }
        self.publish()
    }

    /// Stop and rewind to the full duration
    pub fn reset(&mut self) -> TimerState {
        self.cancel_handle();
        self.elapsed = 0;
        self.duration = self.store.timer_value();
        info!("Countdown reset to {}s", self.duration);
        self.publish()
    }

    /// Persist a new countdown length. A running countdown keeps its current
    /// length until the next start.
    pub fn set_duration(&mut self, value: i64) -> anyhow::Result<TimerState> {
        self.store.set(TIMER_VALUE_KEY, value)?;
        if !self.is_running() {
            self.duration = value;
        }
        info!("Timer duration set to {}s", value);
        Ok(self.publish())
    }

    fn finish(&mut self) {
        self.cancel_handle();
        self.completions += 1;
        info!("Countdown finished after {}s", self.elapsed);
        self.presenter.present(self.locale.alert_title(), self.locale.alert_message());
    }

    fn cancel_handle(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                self.scheduler.cancel(handle);
                true
            }
            None => false,
        }
    }

    fn publish(&self) -> TimerState {
        let state = self.snapshot();
        self.state_tx.send_replace(state.clone());
        state
    }
}

impl<S, D, P> Drop for CountdownController<S, D, P>
where
    S: PeriodicScheduler,
    D: DurationStore,
    P: NotificationPresenter,
{
    fn drop(&mut self) {
        if self.cancel_handle() {
            warn!("Countdown torn down while running, tick registration cancelled");
        }
    }
}
