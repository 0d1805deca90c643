//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{AppState, TimerState};
use super::responses::{AlertResponse, ApiResponse, HealthResponse, SettingsBody, StatusResponse};

fn control_response(
    state: &AppState,
    action: &str,
    result: Result<TimerState, String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(timer) => {
            info!("{} endpoint called - {}s remaining", action, timer.remaining_seconds);
            let display = state.locale.remaining_text(timer.remaining_seconds);
            Ok(Json(ApiResponse::for_timer(
                format!("Countdown {}", action),
                display,
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to {} countdown: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start - Start or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.start().await;
    control_response(&state, "start", result)
}

/// Handle POST /stop - Pause the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.stop().await;
    control_response(&state, "stop", result)
}

/// Handle POST /reset - Stop and rewind the countdown
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.reset().await;
    control_response(&state, "reset", result)
}

/// Handle GET /settings - Return the stored duration, which a running
/// countdown only picks up on its next start
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<SettingsBody> {
    Json(SettingsBody {
        timer_value: state.get_timer_state().timer_value,
    })
}

/// Handle PUT /settings - Store a new duration
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SettingsBody>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if body.timer_value < 0 {
        warn!("Rejected negative timer value: {}", body.timer_value);
        return Err(StatusCode::BAD_REQUEST);
    }

    let result = state.set_duration(body.timer_value).await;
    control_response(&state, "configure", result)
}

/// Handle POST /alert/ack - Dismiss the completion alert
pub async fn acknowledge_alert_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AlertResponse>, StatusCode> {
    match state.acknowledge_alert() {
        Ok(Some(alert)) => Ok(Json(AlertResponse {
            status: "acknowledged".to_string(),
            alert,
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to acknowledge alert: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current countdown status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let alert = match state.pending_alert() {
        Ok(a) => a,
        Err(e) => {
            error!("Failed to get alert state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let timer = state.get_timer_state();
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        display: state.locale.remaining_text(timer.remaining_seconds),
        timer,
        alert,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
