use crate::codec::DecodeError;

use thiserror::Error;

/// Failure talking to the notification backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("invalid backend response: {0}")]
    Decode(String),
    #[error("invalid backend request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Transport(_)
            | BackendError::Decode(_)
            | BackendError::InvalidRequest(_) => None,
        }
    }
}

/// Failure reported by the browser's service worker container or push manager.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The push service no longer recognises the endpoint.
    #[error("push endpoint is no longer valid")]
    StaleEndpoint,
    #[error("service worker registration failed: {0}")]
    Registration(String),
    #[error("push service rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to show notification: {0}")]
    Display(String),
    #[error("failed to reach window clients: {0}")]
    Clients(String),
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error(transparent)]
    Network(#[from] BackendError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
