//! Vizart HTTP Client
//!
//! A simple, type-safe HTTP client for the Vizart image-processing API.
//!
//! This crate provides the transport layer the session orchestrator sits
//! on: submitting try-on/try-off jobs, reading job status, and cancelling
//! jobs. The [`JobTransport`] trait is the seam the orchestrator depends
//! on; [`VizartClient`] is its production implementation.
//!
//! # Example
//!
//! ```no_run
//! use vizart_client::VizartClient;
//! use vizart_core::dto::request::ImagePayload;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vizart_client::ClientError> {
//!     let client = VizartClient::new("http://localhost:8000");
//!
//!     let model = ImagePayload::new("model.jpg", std::fs::read("model.jpg").unwrap());
//!     let garment = ImagePayload::new("shirt.png", std::fs::read("shirt.png").unwrap());
//!
//!     let job_id = client.submit_try_on(model, garment, None).await?;
//!     println!("Submitted job: {}", job_id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod transport;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use transport::JobTransport;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Vizart backend API
///
/// Performs exactly one HTTP exchange per call and never retries; retry
/// policy belongs to the polling layer above.
#[derive(Debug, Clone)]
pub struct VizartClient {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl VizartClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend API (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use vizart_client::VizartClient;
    ///
    /// let client = VizartClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use vizart_client::VizartClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = VizartClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

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
