//! Configuration module
//!
//! Handles CLI configuration including backend URL and polling settings.

use vizart_session::SessionConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Vizart backend
    pub backend_url: String,
    /// Polling cadence and retry threshold for watched jobs
    pub session: SessionConfig,
}
