//! Poll Error Types
//!
//! This module provides poll-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::path::PathBuf;
use std::time::Duration;

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Poll-specific result type alias
pub type PollResult<T> = Result<T, PollError>;

/// Poll-specific error variants
#[derive(Debug, Error)]
pub enum PollError {
    /// No answer stored under this id
    #[error("No answer with id: {0}")]
    AnswerNotFound(String),

    /// Vote attempted by the anonymous sentinel or an empty login
    #[error("Voter is not identified")]
    UnidentifiedVoter,

    /// Input the core refuses to store
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Remote store refused, dropped or failed the call
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Remote store did not answer in time
    #[error("Backend call timed out after {0:?}")]
    Timeout(Duration),

    /// Stored data violates an invariant (missing field, dangling user id, ...)
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Roster files could not be loaded
    #[error("Roster unavailable ({}): {reason}", .path.display())]
    Roster { path: PathBuf, reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PollError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PollError::AnswerNotFound(_) => ErrorKind::NotFound,
            PollError::UnidentifiedVoter | PollError::MalformedInput(_) => ErrorKind::BadRequest,
            PollError::BackendUnavailable(_) | PollError::Timeout(_) => {
                ErrorKind::ServiceUnavailable
            }
            PollError::CorruptRecord(_) | PollError::Roster { .. } | PollError::Config(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            PollError::BackendUnavailable(msg) => {
                tracing::error!(message = %msg, "Poll backend unavailable");
            }
            PollError::Timeout(after) => {
                tracing::error!(timeout = ?after, "Poll backend timed out");
            }
            PollError::CorruptRecord(msg) => {
                tracing::error!(message = %msg, "Poll store holds a corrupt record");
            }
            PollError::Roster { path, reason } => {
                tracing::error!(path = %path.display(), reason = %reason, "Roster unavailable");
            }
            PollError::Config(msg) => {
                tracing::error!(message = %msg, "Poll configuration rejected");
            }
            PollError::UnidentifiedVoter => {
                tracing::warn!("Vote toggle attempted without an identified user");
            }
            _ => {
                tracing::debug!(error = %self, "Poll error");
            }
        }
    }
}

impl From<PollError> for AppError {
    fn from(err: PollError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let app_err = AppError::new(kind, message);
        if err.is_transient() {
            app_err.with_action("Please try again shortly")
        } else {
            app_err
        }
    }
}

impl From<redis::RedisError> for PollError {
    fn from(err: redis::RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::TypeError => PollError::CorruptRecord(err.to_string()),
            redis::ErrorKind::InvalidClientConfig => {
                PollError::Config(format!("redis endpoint: {err}"))
            }
            _ => PollError::BackendUnavailable(err.to_string()),
        }
    }
}
