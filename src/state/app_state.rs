//! Shared application state used by the HTTP handlers

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};

use super::TimerState;
use crate::{
    services::{Alert, AlertPresenter},
    tasks::{countdown::Reply, Command},
    utils::Locale,
};

/// Handle to the countdown task plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// Commands into the countdown task
    pub commands: mpsc::Sender<Command>,
    /// Latest published countdown state
    pub timer_rx: watch::Receiver<TimerState>,
    /// Pending completion alert, shared with the countdown task
    pub alerts: AlertPresenter,
    pub locale: Locale,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        commands: mpsc::Sender<Command>,
        timer_rx: watch::Receiver<TimerState>,
        alerts: AlertPresenter,
        locale: Locale,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            commands,
            timer_rx,
            alerts,
            locale,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Send a command to the countdown task and wait for the resulting state
    async fn request<F>(&self, action: &str, build: F) -> Result<TimerState, String>
    where
        F: FnOnce(Reply) -> Command,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands.send(build(reply_tx)).await
            .map_err(|_| "Countdown task is not running".to_string())?;

        let state = reply_rx.await
            .map_err(|_| "Countdown task dropped the request".to_string())??;

        self.record_action(action);
        Ok(state)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    pub async fn start(&self) -> Result<TimerState, String> {
        self.request("start", Command::Start).await
    }

    pub async fn stop(&self) -> Result<TimerState, String> {
        self.request("stop", Command::Stop).await
    }

    pub async fn reset(&self) -> Result<TimerState, String> {
        self.request("reset", Command::Reset).await
    }

    pub async fn set_duration(&self, value: i64) -> Result<TimerState, String> {
        info!("Setting timer duration to: {}", value);
        self.request("set-duration", |reply| Command::SetDuration(value, reply)).await
    }

    /// Ask the countdown task to exit, cancelling any running registration
    pub async fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).await.is_err() {
            warn!("Countdown task already stopped");
        }
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> TimerState {
        self.timer_rx.borrow().clone()
    }

    pub fn pending_alert(&self) -> Result<Option<Alert>, String> {
        self.alerts.pending()
    }

    /// Dismiss the pending alert
    pub fn acknowledge_alert(&self) -> Result<Option<Alert>, String> {
        let alert = self.alerts.acknowledge()?;
        if alert.is_some() {
            self.record_action("acknowledge");
        }
        Ok(alert)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
