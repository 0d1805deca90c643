//! Countdown state snapshot published to observers

use serde::{Deserialize, Serialize};

/// Whether a tick registration is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
}

/// Point-in-time view of the countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: TimerPhase,
    pub duration_seconds: i64,
    pub elapsed_seconds: i64,
    pub remaining_seconds: u64,
    /// Stored setting; differs from `duration_seconds` when changed mid-run
    pub timer_value: i64,
    /// Completion alerts raised since startup
    pub completions: u64,
}

impl TimerState {
    /// Idle state for a freshly loaded duration
    pub fn idle(duration_seconds: i64) -> Self {
        Self {
            phase: TimerPhase::Idle,
            duration_seconds,
            elapsed_seconds: 0,
            remaining_seconds: remaining_seconds(duration_seconds, 0),
            timer_value: duration_seconds,
            completions: 0,
        }
    }

    /// Check if the countdown is ticking
    pub fn is_active(&self) -> bool {
        self.phase == TimerPhase::Running
    }
}

/// `max(duration - elapsed, 0)`
pub fn remaining_seconds(duration_seconds: i64, elapsed_seconds: i64) -> u64 {
    duration_seconds.saturating_sub(elapsed_seconds).max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_clamped_at_zero() {
        assert_eq!(remaining_seconds(10, 3), 7);
        assert_eq!(remaining_seconds(10, 10), 0);
        assert_eq!(remaining_seconds(0, 1), 0);
        assert_eq!(remaining_seconds(-5, 0), 0);
        assert_eq!(remaining_seconds(i64::MIN, 1), 0);
    }

    #[test]
    fn idle_state_is_inactive() {
        let state = TimerState::idle(10);
        assert!(!state.is_active());
        assert_eq!(state.remaining_seconds, 10);
        assert_eq!(
            serde_json::to_value(&state).unwrap()["phase"],
            serde_json::json!("idle")
        );
    }
}
