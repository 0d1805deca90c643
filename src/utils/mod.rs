//! Utility functions module
//! 
//! This module contains signal handling and display text helpers.

pub mod locale;
pub mod signals;

// Re-export main items
pub use locale::Locale;
pub use signals::shutdown_signal;
