//! Periodic tick scheduling
//!
//! A scheduler hands out a [`TimerHandle`] per registration and delivers that
//! handle back to the owner of the countdown once per interval. Delivery goes
//! through a channel instead of a stored closure so that the countdown task
//! stays the only place where timer state is mutated.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Token identifying one periodic registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Source of repeating ticks
pub trait PeriodicScheduler {
    /// Register a repeating tick every `interval`, first firing one interval from now
    fn register(&mut self, interval: Duration) -> TimerHandle;

    /// Cancel a registration. Unknown or already cancelled handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Whether the registration is still live
    fn is_active(&self, handle: TimerHandle) -> bool;
}

/// Wall-clock scheduler backed by tokio interval tasks
#[derive(Debug)]
pub struct TokioScheduler {
    tick_tx: mpsc::UnboundedSender<TimerHandle>,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    /// Ticks for every registration are sent into `tick_tx`
    pub fn new(tick_tx: mpsc::UnboundedSender<TimerHandle>) -> Self {
        Self {
            tick_tx,
            tasks: HashMap::new(),
            next_id: 1,
        }
    }
}

impl PeriodicScheduler for TokioScheduler {
    fn register(&mut self, period: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        let tick_tx = self.tick_tx.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tick_tx.send(handle).is_err() {
                    debug!("Tick receiver gone, ending registration {}", handle.id());
                    break;
                }
            }
        });

        debug!("Registered periodic tick {} every {:?}", handle.id(), period);
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            debug!("Cancelled periodic tick {}", handle.id());
        }
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.tasks
            .get(&handle)
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// Scheduler that never fires on its own.
///
/// Callers drive time by feeding [`ManualScheduler::active_handles`] back into
/// the countdown. Useful for tests and for embedding the controller in a host
/// that has its own clock.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    active: HashSet<TimerHandle>,
    next_id: u64,
    registrations: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles that are currently registered
    pub fn active_handles(&self) -> Vec<TimerHandle> {
        self.active.iter().copied().collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Total number of `register` calls seen
    pub fn registrations(&self) -> usize {
        self.registrations
    }
}

impl PeriodicScheduler for ManualScheduler {
    fn register(&mut self, _interval: Duration) -> TimerHandle {
        self.next_id += 1;
        self.registrations += 1;
        let handle = TimerHandle(self.next_id);
        self.active.insert(handle);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.active.remove(&handle);
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.active.contains(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_fires_once_per_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(tx);
        let handle = scheduler.register(Duration::from_secs(1));
        assert!(scheduler.is_active(handle));

        for _ in 0..3 {
            let fired = rx.recv().await.unwrap();
            assert_eq!(fired, handle);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_does_not_fire_before_first_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(tx);
        let start = Instant::now();
        let handle = scheduler.register(Duration::from_secs(1));

        assert_eq!(rx.recv().await, Some(handle));
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_registration_stops_firing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(tx);
        let handle = scheduler.register(Duration::from_secs(1));
        assert_eq!(rx.recv().await, Some(handle));

        scheduler.cancel(handle);
        scheduler.cancel(handle);
        assert!(!scheduler.is_active(handle));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_scheduler_closes_tick_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(tx);
        scheduler.register(Duration::from_secs(1));
        drop(scheduler);

        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn manual_scheduler_tracks_registrations() {
        let mut scheduler = ManualScheduler::new();
        let first = scheduler.register(Duration::from_secs(1));
        let second = scheduler.register(Duration::from_secs(1));
        assert_ne!(first, second);
        assert_eq!(scheduler.active_count(), 2);

        scheduler.cancel(first);
        scheduler.cancel(first);
        assert!(!scheduler.is_active(first));
        assert!(scheduler.is_active(second));
        assert_eq!(scheduler.registrations(), 2);
    }
}
