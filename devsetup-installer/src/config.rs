//! Installer configuration
//!
//! Defines how install scripts are launched: the command interpreter, the
//! environment overlay that forces non-interactive behavior, and the optional
//! per-script timeout.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::InstallError;

/// Installer configuration
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Command interpreter used to run install scripts
    pub interpreter: String,

    /// Environment variables added on top of the inherited environment
    pub env: HashMap<String, String>,

    /// Maximum time a single script may run. `None` waits indefinitely,
    /// which is the default.
    pub script_timeout: Option<Duration>,
}

impl InstallerConfig {
    /// Creates a configuration with the default non-interactive overlay
    pub fn new(interpreter: impl Into<String>) -> Self {
        let mut env = HashMap::new();
        env.insert("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string());
        // many installers skip their prompts when they see CI
        env.insert("CI".to_string(), "true".to_string());

        Self {
            interpreter: interpreter.into(),
            env,
            script_timeout: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DEVSETUP_SHELL (optional, default: bash)
    /// - DEVSETUP_SCRIPT_TIMEOUT (optional, seconds, default: no timeout)
    pub fn from_env() -> Self {
        let interpreter = std::env::var("DEVSETUP_SHELL").unwrap_or_else(|_| "bash".to_string());

        let script_timeout = std::env::var("DEVSETUP_SCRIPT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            script_timeout,
            ..Self::new(interpreter)
        }
    }

    /// Adds or overrides an environment variable for every script
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets a per-script timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = Some(timeout);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), InstallError> {
        if self.interpreter.trim().is_empty() {
            return Err(InstallError::InvalidArgument(
                "interpreter cannot be empty".to_string(),
            ));
        }

        if self.script_timeout == Some(Duration::ZERO) {
            return Err(InstallError::InvalidArgument(
                "script_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self::new("bash")
    }
}
