//! Devsetup HTTP Client
//!
//! A type-safe HTTP client for the devsetup server API, used by the CLI.
//!
//! # Example
//!
//! ```no_run
//! use devsetup_client::InstallerClient;
//!
//! #[tokio::main]
//! async fn main() -> devsetup_client::Result<()> {
//!     let client = InstallerClient::new("http://localhost:7842");
//!
//!     for tool in client.list_tools().await? {
//!         println!("{} ({})", tool.display_name, tool.category);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod install;
mod tools;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the devsetup server API
///
/// Endpoints are organized into two groups:
/// - Tool catalog (tools, tool sets)
/// - Installations (start, cancel, job status, active jobs)
#[derive(Debug, Clone)]
pub struct InstallerClient {
    /// Base URL of the server (e.g., "http://localhost:7842")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl InstallerClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the server (e.g., "http://localhost:7842")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        debug!("{} -> {}", response.url().path(), status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = InstallerClient::new("http://localhost:7842");
        assert_eq!(client.base_url(), "http://localhost:7842");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = InstallerClient::new("http://localhost:7842/");
        assert_eq!(client.base_url(), "http://localhost:7842");
    }
}
