//! Live remaining-time display

use tokio::sync::watch;
use tracing::info;

use crate::{state::TimerState, utils::Locale};

/// Log the localized remaining-time line whenever it changes
pub async fn display_task(mut state_rx: watch::Receiver<TimerState>, locale: Locale) {
    let mut last_line = String::new();

    loop {
        let line = {
            let state = state_rx.borrow_and_update();
            render(&state, locale)
        };

        if line != last_line {
            info!("{}", line);
            last_line = line;
        }

        if state_rx.changed().await.is_err() {
            break;
        }
    }
}

/// Display line for a state, e.g. `10 seconds remaining [running]`
pub fn render(state: &TimerState, locale: Locale) -> String {
    let phase = if state.is_active() { "running" } else { "idle" };
    format!("{} [{}]", locale.remaining_text(state.remaining_seconds), phase)
}
