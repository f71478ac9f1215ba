//! Error types for clarity-core

use thiserror::Error;

/// Result type alias using clarity-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in clarity-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend rejected the bearer token (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend answered with a non-2xx status
    #[error("{0}")]
    Api(String),

    /// Invalid input, rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Task not found in the local collection
    #[error("Task not found: {0}")]
    NotFound(String),

    /// A delete request is already in flight for the staged task
    #[error("A delete request is already in progress")]
    DeleteInFlight,

    /// Confirmation was requested without a staged task
    #[error("No task is staged for deletion")]
    NothingStaged,

    /// Local persistence error (token store, activity cache, snapshots)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Returns `true` for validation failures that never reached the network.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns `true` when the caller should send the user back to login.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Inline message shown when a remote operation fails.
    ///
    /// Backend errors already carry their `failure` prefix; transport and
    /// local errors get it here.
    #[must_use]
    pub fn user_message(&self, failure: &str) -> String {
        match self {
            Self::Api(message) | Self::InvalidInput(message) => message.clone(),
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::Http(error) if error.is_timeout() => format!("{failure}: request timed out"),
            Self::Http(_) => format!("{failure}: could not reach the server"),
            other => format!("{failure}: {other}"),
        }
    }
}
