//! Configuration module
//!
//! Handles CLI configuration including the server URL and polling settings.

use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the devsetup server
    pub server_url: String,

    /// How often `--wait` polls job status
    pub poll_interval: Duration,
}

impl Config {
    pub fn new(server_url: String) -> Self {
        Self {
            server_url,
            poll_interval: Duration::from_secs(1),
        }
    }
}
