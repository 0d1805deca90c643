//! Background tasks module
//! 
//! This module contains the tasks that run alongside the HTTP server.

pub mod countdown;
pub mod display;

// Re-export main items
pub use countdown::{countdown_task, spawn_countdown, Command, CountdownTask};
pub use display::display_task;
