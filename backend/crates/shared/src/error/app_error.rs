//! Application Error
//!
//! [`AppError`] is what leaves a domain crate. Each crate keeps its own
//! `thiserror` enum and converts into this at the boundary.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

type Text = Cow<'static, str>;
type BoxedSource = Box<dyn Error + Send + Sync + 'static>;

/// ```rust
/// use kernel::error::app_error::AppError;
///
/// let err = AppError::not_found("No answer with id abc").with_action("Reload the list");
/// assert_eq!(err.status_code(), 404);
/// assert_eq!(err.action(), Some("Reload the list"));
/// ```
pub struct AppError {
    kind: ErrorKind,
    /// Safe to show to a client
    message: Text,
    /// What the client can do about it
    action: Option<Text>,
    /// Kept for logs, never rendered
    source: Option<BoxedSource>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Text>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
            source: None,
        }
    }

    pub fn bad_request(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    pub fn service_unavailable(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn with_action(self, action: impl Into<Text>) -> Self {
        Self {
            action: Some(action.into()),
            ..self
        }
    }

    pub fn with_source<E>(self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("action", &self.action)
            .field("source", &self.source.as_ref().map(|s| s.to_string()))
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "{}: {}. {action}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|s| s as &(dyn Error + 'static))
    }
}

/// Attach a kind and a client-safe message to a foreign error.
pub trait ResultExt<T> {
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Text>) -> AppResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Text>) -> AppResult<T> {
        self.map_err(|e| AppError::new(kind, message).with_source(e))
    }
}

pub trait OptionExt<T> {
    fn ok_or_app_err(self, kind: ErrorKind, message: impl Into<Text>) -> AppResult<T>;

    fn ok_or_not_found(self, message: impl Into<Text>) -> AppResult<T>
    where
        Self: Sized,
    {
        self.ok_or_app_err(ErrorKind::NotFound, message)
    }
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_app_err(self, kind: ErrorKind, message: impl Into<Text>) -> AppResult<T> {
        self.ok_or_else(|| AppError::new(kind, message))
    }
}
