//! State management module
//! 
//! This module contains the countdown snapshot and the shared handle used by
//! the HTTP layer.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::{TimerPhase, TimerState};
