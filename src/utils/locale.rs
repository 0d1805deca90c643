//! Localized display text

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Language for the remaining-time line and the completion alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    /// Format the live "N seconds remaining" line
    pub fn remaining_text(&self, seconds: u64) -> String {
        match self {
            Locale::En if seconds == 1 => "1 second remaining".to_string(),
            Locale::En => format!("{} seconds remaining", seconds),
            Locale::Ja => format!("残り{}秒", seconds),
        }
    }

    /// Title of the completion alert
    pub fn alert_title(&self) -> &'static str {
        match self {
            Locale::En => "Finished",
            Locale::Ja => "終了",
        }
    }

    /// Body of the completion alert
    pub fn alert_message(&self) -> &'static str {
        match self {
            Locale::En => "Time is up",
            Locale::Ja => "タイマー終了時間です",
        }
    }
}
