//! Countdown background task
//!
//! The controller lives here and nowhere else. User commands and scheduler
//! ticks are processed one at a time from the same `select!` loop.

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info};

use crate::{
    services::{DurationStore, NotificationPresenter},
    state::TimerState,
    timer::{CountdownController, PeriodicScheduler, TimerHandle, TokioScheduler},
    utils::Locale,
};

/// Capacity of the user command queue
pub const COMMAND_QUEUE_SIZE: usize = 32;

/// Reply channel carried by each command
pub type Reply = oneshot::Sender<Result<TimerState, String>>;

/// Operations requested from outside the countdown task
#[derive(Debug)]
pub enum Command {
    Start(Reply),
    Stop(Reply),
    Reset(Reply),
    SetDuration(i64, Reply),
    Shutdown,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start(_) => "start",
            Command::Stop(_) => "stop",
            Command::Reset(_) => "reset",
            Command::SetDuration(..) => "set-duration",
            Command::Shutdown => "shutdown",
        }
    }
}

/// Channels for talking to a spawned countdown task
#[derive(Debug)]
pub struct CountdownTask {
    pub commands: mpsc::Sender<Command>,
    pub state_rx: watch::Receiver<TimerState>,
    pub join: JoinHandle<()>,
}

/// Spawn the countdown task on the wall-clock scheduler
pub fn spawn_countdown<D, P>(store: D, presenter: P, locale: Locale) -> CountdownTask
where
    D: DurationStore + Send + 'static,
    P: NotificationPresenter + Send + 'static,
{
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);

    let controller = CountdownController::new(TokioScheduler::new(tick_tx), store, presenter, locale);
    let state_rx = controller.subscribe();

    let join = tokio::spawn(countdown_task(controller, command_rx, tick_rx));

    CountdownTask {
        commands: command_tx,
        state_rx,
        join,
    }
}

/// Drive `controller` until shutdown is requested or every command sender is gone.
/// Dropping the controller on exit cancels any live registration.
pub async fn countdown_task<S, D, P>(
    mut controller: CountdownController<S, D, P>,
    mut commands: mpsc::Receiver<Command>,
    mut ticks: mpsc::UnboundedReceiver<TimerHandle>,
) where
    S: PeriodicScheduler,
    D: DurationStore,
    P: NotificationPresenter,
{
    info!("Starting countdown task");

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("Command channel closed");
                    break;
                };

                debug!("Countdown task received command: {}", command.name());
                match command {
                    Command::Start(reply) => respond(reply, Ok(controller.start())),
                    Command::Stop(reply) => respond(reply, Ok(controller.stop())),
                    Command::Reset(reply) => respond(reply, Ok(controller.reset())),
                    Command::SetDuration(value, reply) => {
                        let result = controller
                            .set_duration(value)
                            .map_err(|e| format!("Failed to store timer duration: {:#}", e));
                        if let Err(e) = &result {
                            error!("{}", e);
                        }
                        respond(reply, result);
                    }
                    Command::Shutdown => {
                        info!("Countdown task shutting down");
                        break;
                    }
                }
            }

            Some(handle) = ticks.recv() => {
                controller.on_tick(handle);
            }
        }
    }

    drop(controller);
    info!("Countdown task stopped");
}

fn respond(reply: Reply, result: Result<TimerState, String>) {
    if reply.send(result).is_err() {
        debug!("Command caller went away before the reply");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::{AlertPresenter, MemoryStore};

    async fn request(
        commands: &mpsc::Sender<Command>,
        build: impl FnOnce(Reply) -> Command,
    ) -> TimerState {
        let (tx, rx) = oneshot::channel();
        commands.send(build(tx)).await.unwrap();
        rx.await.unwrap().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_reaches_zero_on_wall_clock() {
        let alerts = AlertPresenter::new(false);
        let task = spawn_countdown(MemoryStore::with_timer_value(3), alerts.clone(), Locale::En);
        let mut state_rx = task.state_rx.clone();

        let state = request(&task.commands, Command::Start).await;
        assert!(state.is_active());

        state_rx
            .wait_for(|state| state.completions == 1)
            .await
            .unwrap();
        let state = state_rx.borrow().clone();
        assert_eq!(state.remaining_seconds, 0);
        assert!(!state.is_active());
        assert!(alerts.pending().unwrap().is_some());

        task.commands.send(Command::Shutdown).await.unwrap();
        task.join.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_freezes_remaining_time() {
        let alerts = AlertPresenter::new(false);
        let task = spawn_countdown(MemoryStore::with_timer_value(5), alerts.clone(), Locale::En);
        let mut state_rx = task.state_rx.clone();

        request(&task.commands, Command::Start).await;
        state_rx
            .wait_for(|state| state.elapsed_seconds == 2)
            .await
            .unwrap();

        let state = request(&task.commands, Command::Stop).await;
        assert_eq!(state.remaining_seconds, 3);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(state_rx.borrow().remaining_seconds, 3);
        assert!(alerts.pending().unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn set_duration_updates_idle_display() {
        let task = spawn_countdown(MemoryStore::new(), AlertPresenter::new(false), Locale::En);

        let state = request(&task.commands, |reply| Command::SetDuration(25, reply)).await;
        assert_eq!(state.duration_seconds, 25);
        assert_eq!(state.remaining_seconds, 25);
    }

    struct ReadOnlyStore;

    impl DurationStore for ReadOnlyStore {
        fn get(&self, _key: &str, default: i64) -> i64 {
            default
        }

        fn set(&mut self, _key: &str, _value: i64) -> anyhow::Result<()> {
            anyhow::bail!("settings are read-only")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_store_write_leaves_countdown_untouched() {
        let task = spawn_countdown(ReadOnlyStore, AlertPresenter::new(false), Locale::En);
        let started = request(&task.commands, Command::Start).await;

        let (tx, rx) = oneshot::channel();
        task.commands.send(Command::SetDuration(30, tx)).await.unwrap();
        let err = rx.await.unwrap().unwrap_err();
        assert!(err.contains("read-only"));

        let state = task.state_rx.borrow().clone();
        assert_eq!(state.duration_seconds, 10);
        assert_eq!(state.timer_value, 10);
        assert_eq!(state.phase, started.phase);
    }

    #[tokio::test(start_paused = true)]
    async fn task_exits_when_senders_drop() {
        let task = spawn_countdown(MemoryStore::new(), AlertPresenter::new(false), Locale::En);
        request(&task.commands, Command::Start).await;

        drop(task.commands);
        task.join.await.unwrap();
    }
}
