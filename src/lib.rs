//! My Timer - A countdown timer with start/stop/reset controls
//! 
//! This library provides the countdown state machine, its scheduler, store
//! and alert collaborators, and an HTTP control surface around them.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use timer::CountdownController;
pub use utils::signals::shutdown_signal;
