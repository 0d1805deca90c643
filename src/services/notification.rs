//! Completion alert presentation

use std::sync::{Arc, Mutex};
use chrono::{DateTime, Utc};
use notify_rust::{Notification, Timeout};
use serde::{Deserialize, Serialize};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{info, warn};

/// Receives the end-of-countdown signal
pub trait NotificationPresenter {
    fn present(&self, title: &str, message: &str);
}

/// An alert waiting for the user to acknowledge it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Holds the pending alert until it is dismissed.
///
/// Clones share the same slot, so the countdown task can raise an alert
/// that an HTTP handler later acknowledges.
#[derive(Debug, Clone, Default)]
pub struct AlertPresenter {
    pending: Arc<Mutex<Option<Alert>>>,
    desktop: bool,
}

impl AlertPresenter {
    pub fn new(desktop: bool) -> Self {
        Self {
            pending: Arc::new(Mutex::new(None)),
            desktop,
        }
    }

    /// The alert currently on screen, if any
    pub fn pending(&self) -> Result<Option<Alert>, String> {
        self.pending.lock()
            .map(|alert| alert.clone())
            .map_err(|e| format!("Failed to lock alert state: {}", e))
    }

    /// Dismiss the pending alert (the "OK" action)
    pub fn acknowledge(&self) -> Result<Option<Alert>, String> {
        let mut pending = self.pending.lock()
            .map_err(|e| format!("Failed to lock alert state: {}", e))?;

        let alert = pending.take();
        if alert.is_some() {
            info!("Alert acknowledged");
        }
        Ok(alert)
    }

    /// Raise the desktop notification off the countdown task; the D-Bus
    /// round-trip blocks until the notification server answers.
    fn show_desktop(&self, title: &str, message: &str) -> Option<JoinHandle<()>> {
        let title = title.to_string();
        let message = message.to_string();
        let show = move || {
            let result = Notification::new()
                .summary(&title)
                .body(&message)
                .timeout(Timeout::Milliseconds(5000))
                .show();

            if let Err(e) = result {
                warn!("Failed to show desktop notification: {}", e);
            }
        };

        match Handle::try_current() {
            Ok(runtime) => Some(runtime.spawn_blocking(show)),
            Err(_) => {
                std::thread::spawn(show);
                None
            }
        }
    }
}

impl NotificationPresenter for AlertPresenter {
    fn present(&self, title: &str, message: &str) {
        info!("{}: {}", title, message);

        match self.pending.lock() {
            Ok(mut pending) => {
                *pending = Some(Alert {
                    title: title.to_string(),
                    message: message.to_string(),
                    raised_at: Utc::now(),
                });
            }
            Err(e) => warn!("Failed to record alert: {}", e),
        }

        if self.desktop {
            self.show_desktop(title, message);
        }
    }
}
