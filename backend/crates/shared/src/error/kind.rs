//! Error Kind
//!
//! [`ErrorKind`] is the coarse classification every domain error maps onto.
//! The transport layer turns it into a status code; domain crates never pick
//! status codes directly.

use serde::Serialize;

/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::NotFound.status_code(), 404);
/// assert!(ErrorKind::ServiceUnavailable.is_transient());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Input the core refuses
    BadRequest,
    /// The addressed record does not exist
    NotFound,
    /// An invariant broke inside the service
    InternalServerError,
    /// A backing service is unreachable or too slow
    ServiceUnavailable,
}

impl ErrorKind {
    const fn entry(self) -> (u16, &'static str) {
        match self {
            Self::BadRequest => (400, "bad request"),
            Self::NotFound => (404, "not found"),
            Self::InternalServerError => (500, "internal error"),
            Self::ServiceUnavailable => (503, "service unavailable"),
        }
    }

    pub const fn status_code(self) -> u16 {
        self.entry().0
    }

    /// Short lowercase label, used in logs and `Display`
    pub const fn label(self) -> &'static str {
        self.entry().1
    }

    pub const fn is_server_error(self) -> bool {
        self.status_code() >= 500
    }

    /// Retrying the same call may succeed
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::ServiceUnavailable)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
