//! Fiscal period error types.

use chrono::NaiveDate;
use lekha_shared::types::FiscalPeriodId;
use lekha_shared::{AppError, ErrorKind};
use thiserror::Error;

use crate::calendar::CalendarError;
use crate::repository::RepositoryError;

/// Errors that can occur during fiscal period operations.
#[derive(Debug, Error)]
pub enum FiscalError {
    // ========== Validation Errors ==========
    /// Period name is blank.
    #[error("Fiscal period name cannot be empty")]
    EmptyName,

    /// Start date must be before end date.
    #[error("Start date {start} must be before end date {end}")]
    InvalidDateRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// Dates or name could not be mapped onto the calendar.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    // ========== Conflict Errors ==========
    /// Another period of the tenant already uses this name.
    #[error("Fiscal period '{0}' already exists")]
    DuplicateName(String),

    // ========== Lookup Errors ==========
    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    // ========== State Errors ==========
    /// Period is closed; numbering and posting are frozen.
    #[error("Fiscal period {0} is closed")]
    PeriodClosed(FiscalPeriodId),

    /// Close was requested for a period that is already closed.
    #[error("Fiscal period {0} is already closed")]
    AlreadyClosed(FiscalPeriodId),

    /// Reopen was requested for a period that is not closed.
    #[error("Fiscal period {0} is not closed")]
    NotClosed(FiscalPeriodId),

    /// The current period cannot be deleted.
    #[error("Cannot delete the current fiscal period {0}")]
    CannotDeleteCurrent(FiscalPeriodId),

    /// A closed period cannot be deleted.
    #[error("Cannot delete closed fiscal period {0}")]
    CannotDeleteClosed(FiscalPeriodId),

    /// A period referenced by journal entries cannot be deleted.
    #[error("Cannot delete fiscal period {0}: journal entries reference it")]
    HasEntries(FiscalPeriodId),

    // ========== Storage Errors ==========
    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl FiscalError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName | Self::InvalidDateRange { .. } | Self::Calendar(_) => {
                ErrorKind::Validation
            }
            Self::DuplicateName(_) => ErrorKind::Conflict,
            Self::PeriodNotFound(_) => ErrorKind::NotFound,
            Self::PeriodClosed(_)
            | Self::AlreadyClosed(_)
            | Self::NotClosed(_)
            | Self::CannotDeleteCurrent(_)
            | Self::CannotDeleteClosed(_)
            | Self::HasEntries(_) => ErrorKind::State,
            Self::Repository(RepositoryError::UniqueViolation(_)) => ErrorKind::Conflict,
            Self::Repository(_) => ErrorKind::Infrastructure,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_PERIOD_NAME",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::Calendar(err) => err.error_code(),
            Self::DuplicateName(_) => "DUPLICATE_PERIOD_NAME",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::AlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::NotClosed(_) => "PERIOD_NOT_CLOSED",
            Self::CannotDeleteCurrent(_) => "CANNOT_DELETE_CURRENT_PERIOD",
            Self::CannotDeleteClosed(_) => "CANNOT_DELETE_CLOSED_PERIOD",
            Self::HasEntries(_) => "PERIOD_HAS_ENTRIES",
            Self::Repository(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(err) if err.is_transient())
    }
}

impl From<FiscalError> for AppError {
    fn from(err: FiscalError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}
