//! Session error taxonomy

use thiserror::Error;
use vizart_client::ClientError;

/// Errors surfaced by the session orchestrator
///
/// Carries plain strings rather than source errors so it can be cloned
/// into the watch-channel read model and compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A job is already submitting or active on this orchestrator
    #[error("another job is already in progress")]
    Busy,

    /// Request rejected before or at submission (not retried)
    #[error("invalid request: {0}")]
    Validation(String),

    /// Network-level failure talking to the backend
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend reported a failure of its own
    #[error("server error: {0}")]
    Server(String),

    /// The session was cancelled locally while an operation was in flight
    #[error("cancelled by user")]
    Cancelled,
}

impl From<&ClientError> for SessionError {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::InvalidRequest(message) => Self::Validation(message.clone()),
            ClientError::ApiError { .. } if err.is_client_error() => {
                Self::Validation(err.to_string())
            }
            ClientError::ApiError { .. } => Self::Server(err.to_string()),
            ClientError::RequestFailed(_) | ClientError::ParseError(_) => {
                Self::Transport(err.to_string())
            }
        }
    }
}

impl From<ClientError> for SessionError {
    fn from(err: ClientError) -> Self {
        Self::from(&err)
    }
}
