use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(clarity_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No task description provided")]
    EmptyDescription,
    #[error("Nothing to change. Pass --title, --due or --completed.")]
    NothingToEdit,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Not signed in or session expired. Run `clarity auth login` and try again.")]
    LoginRequired,
    #[error("Server did not become ready")]
    ServerUnavailable,
    #[error("Interrupted")]
    Interrupted,
}

impl From<clarity_core::Error> for CliError {
    fn from(error: clarity_core::Error) -> Self {
        if error.is_unauthorized() {
            Self::LoginRequired
        } else {
            Self::Core(error)
        }
    }
}
