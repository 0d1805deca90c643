//! Countdown core
//!
//! The controller is a plain state machine; ticks reach it through whatever
//! [`PeriodicScheduler`] it was built with.

pub mod controller;
pub mod scheduler;

pub use controller::{CountdownController, TICK_INTERVAL};
pub use scheduler::{ManualScheduler, PeriodicScheduler, TimerHandle, TokioScheduler};
