//! Application-wide error types.
//!
//! Every domain error in the workspace converts into [`AppError`], which
//! carries one of the [`ErrorKind`]s callers branch on.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Classification shared by every error the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input violates a domain rule.
    Validation,
    /// Uniqueness or status clash, such as posting an entry twice.
    Conflict,
    /// Operation is not allowed in the current lifecycle state.
    State,
    /// A referenced record does not exist.
    NotFound,
    /// Storage or runtime failure outside the domain.
    Infrastructure,
}

impl ErrorKind {
    /// Returns true for the kinds caused by the request rather than the system.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::Infrastructure)
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict (e.g., duplicate entry or double posting).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Lifecycle state forbids the operation.
    #[error("Invalid state: {0}")]
    State(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an error of the given kind.
    ///
    /// Infrastructure failures are reported as [`AppError::Database`].
    #[must_use]
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::State => Self::State(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Infrastructure => Self::Database(message),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::State(_) => ErrorKind::State,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Database(_) | Self::Internal(_) => ErrorKind::Infrastructure,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::State(_) => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::State(_) => "INVALID_STATE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
