//! Errors reported by repository implementations.
//!
//! The db crate and [`crate::memory`] translate their storage failures into
//! [`RepositoryError`] so services can tell uniqueness clashes and transient
//! outages apart without knowing the backend.

use lekha_shared::AppError;
use thiserror::Error;

/// Storage failure reported through a repository trait.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Storage could not be reached; the statement never ran.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Backend(String),
}

impl RepositoryError {
    /// Creates a backend error from any displayable error.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }

    /// Returns true if repeating the call cannot apply it twice.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueViolation(msg) => Self::Conflict(msg),
            other => Self::Database(other.to_string()),
        }
    }
}
