//! External collaborators of the countdown
//!
//! The persisted duration setting and the completion alert.

pub mod duration_store;
pub mod notification;

// Re-export main items
pub use duration_store::{DurationStore, JsonFileStore, MemoryStore, DEFAULT_TIMER_VALUE, TIMER_VALUE_KEY};
pub use notification::{Alert, AlertPresenter, NotificationPresenter};
