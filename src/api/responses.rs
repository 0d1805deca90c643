//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{services::Alert, state::TimerState};

/// API response structure for countdown control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub display: String,
    pub timer: TimerState,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, display: String, timer: TimerState) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            display,
            timer,
        }
    }

    /// Response whose status mirrors the timer phase
    pub fn for_timer(message: String, display: String, timer: TimerState) -> Self {
        let status = if timer.is_active() { "running" } else { "idle" };
        Self::new(status.to_string(), message, display, timer)
    }
}

/// Full status of the countdown and the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub display: String,
    pub alert: Option<Alert>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Body of GET and PUT /settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsBody {
    pub timer_value: i64,
}

/// Response of POST /alert/ack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertResponse {
    pub status: String,
    pub alert: Alert,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
