//! Configuration module for the timetable solver CLI.
//!
//! Loads ambient configuration (currently just the log level) from
//! environment variables using the figment crate, following the same
//! flexible-duration deserialization pattern as the rest of this crate's
//! config surface even though no duration field is needed here yet.

use serde::Deserialize;

/// Main application configuration.
#[derive(Deserialize)]
pub struct Config {
    /// Log level for the application.
    ///
    /// Valid values are: "trace", "debug", "info", "warn", "error"
    /// Defaults to "info" if not specified
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Default log level of "info"
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}
