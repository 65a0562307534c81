//! Errors surfaced by the command-line front end.

use std::process::ExitCode;

use tracing::error;
use tubeplay_core::ErrorKind;

use crate::logging::LoggingError;

/// Anything that can make a command fail.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A core operation failed.
    #[error(transparent)]
    Core(#[from] tubeplay_core::Error),

    /// Logging could not be set up.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// Output could not be encoded.
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    /// The playback task ended abnormally.
    #[error("Playback task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CliError {
    /// Core error category, if this wraps a core error.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Core(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Process exit status for this error.
    ///
    /// Bad input exits with 2, configuration problems with 3, service
    /// failures with 4, and everything else with 1.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        match self.kind() {
            Some(ErrorKind::InvalidInput) => 2,
            Some(ErrorKind::Configuration) => 3,
            Some(ErrorKind::Upstream | ErrorKind::NotFound | ErrorKind::InvalidResponse) => 4,
            _ => 1,
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Log the failure and print it for the user.
    pub fn report(&self) {
        if let Self::Core(e) = self {
            error!(
                "Command failed [kind={:?}, retryable={}]: {}",
                e.kind(),
                e.is_retryable(),
                e
            );
            if e.is_retryable() {
                eprintln!("error: {e} (temporary, try again later)");
                return;
            }
        } else {
            error!("Command failed: {}", self);
        }
        eprintln!("error: {self}");
    }
}
