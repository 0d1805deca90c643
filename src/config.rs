//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;

use crate::utils::Locale;

/// File name used for the persisted settings when no path is given
pub const SETTINGS_FILE_NAME: &str = "my-timer-settings.json";

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "my-timer")]
#[command(about = "A countdown timer service with start/stop/reset controls")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Path of the JSON file holding the persisted timer duration
    #[arg(long)]
    pub settings_file: Option<PathBuf>,

    /// Language used for the remaining-time display and the completion alert
    #[arg(short, long, value_enum, default_value = "en")]
    pub locale: Locale,

    /// Also raise a desktop notification when the countdown finishes
    #[arg(long)]
    pub desktop_notify: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Resolve where the duration setting is persisted.
    ///
    /// An explicit `--settings-file` wins; otherwise the platform config
    /// directory is used, falling back to the working directory.
    pub fn settings_path(&self) -> PathBuf {
        if let Some(path) = &self.settings_file {
            return path.clone();
        }

        ProjectDirs::from("", "", "my-timer")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_to_localhost() {
        let config = Config::try_parse_from(["my-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.log_level(), "info");
        assert!(!config.desktop_notify);
    }

    #[test]
    fn explicit_settings_file_is_used() {
        let config = Config::try_parse_from([
            "my-timer",
            "--settings-file",
            "/tmp/timer.json",
            "--locale",
            "ja",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.settings_path(), PathBuf::from("/tmp/timer.json"));
        assert_eq!(config.locale, Locale::Ja);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn default_settings_path_ends_with_file_name() {
        let config = Config::try_parse_from(["my-timer"]).unwrap();
        assert!(config.settings_path().ends_with(SETTINGS_FILE_NAME));
    }
}
