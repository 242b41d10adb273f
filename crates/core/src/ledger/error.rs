//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur while maintaining accounts,
//! recording and posting journal entries, and projecting ledgers.

use chrono::NaiveDate;
use lekha_shared::types::{AccountId, FiscalPeriodId, JournalEntryId};
use lekha_shared::{AppError, ErrorKind};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::fiscal::FiscalError;
use crate::repository::RepositoryError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines, got {0}")]
    InsufficientLines(usize),

    /// A line carries a negative amount.
    #[error("Line {line}: debit and credit cannot be negative")]
    NegativeAmount {
        /// Zero-based line index.
        line: usize,
    },

    /// A line amount does not fit the stored precision of 15 integer
    /// and 4 fractional digits, or the line totals overflowed.
    #[error("Line {line}: amount is out of range")]
    AmountOutOfRange {
        /// Zero-based line index.
        line: usize,
    },

    /// Journal entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Transaction date is outside the fiscal period.
    #[error("Transaction date {date} is outside the fiscal period ({start} to {end})")]
    DateOutsidePeriod {
        /// Requested transaction date.
        date: NaiveDate,
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },

    /// Entries cannot be recorded in a closed period.
    #[error("Cannot record entries in closed fiscal period {0}")]
    EntryInClosedPeriod(FiscalPeriodId),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Account code is blank.
    #[error("Account code cannot be empty")]
    EmptyAccountCode,

    /// Account name is blank.
    #[error("Account name cannot be empty")]
    EmptyAccountName,

    /// Parent account does not exist for the tenant or is the account itself.
    #[error("Invalid parent account: {0}")]
    InvalidParent(AccountId),

    /// Ledger window is inverted.
    #[error("Invalid date window: {from} is after {to}")]
    InvalidDateWindow {
        /// Window start.
        from: NaiveDate,
        /// Window end.
        to: NaiveDate,
    },

    /// A running balance left the representable decimal range.
    #[error("Running balance overflowed for account {0}")]
    BalanceOverflow(AccountId),

    // ========== Conflict Errors ==========
    /// Account code already used by the tenant.
    #[error("Account code '{0}' already exists")]
    DuplicateAccountCode(String),

    /// Journal entry has already been posted.
    #[error("Journal entry {0} is already posted")]
    AlreadyPosted(JournalEntryId),

    // ========== Lookup Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    // ========== Delegated Errors ==========
    /// Fiscal period lookup or gating failed.
    #[error(transparent)]
    Fiscal(#[from] FiscalError),

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LedgerError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientLines(_)
            | Self::NegativeAmount { .. }
            | Self::AmountOutOfRange { .. }
            | Self::Unbalanced { .. }
            | Self::DateOutsidePeriod { .. }
            | Self::EntryInClosedPeriod(_)
            | Self::AccountInactive(_)
            | Self::EmptyAccountCode
            | Self::EmptyAccountName
            | Self::InvalidParent(_)
            | Self::InvalidDateWindow { .. }
            | Self::BalanceOverflow(_) => ErrorKind::Validation,
            Self::DuplicateAccountCode(_) | Self::AlreadyPosted(_) => ErrorKind::Conflict,
            Self::AccountNotFound(_) | Self::EntryNotFound(_) => ErrorKind::NotFound,
            Self::Fiscal(err) => err.kind(),
            Self::Repository(RepositoryError::UniqueViolation(_)) => ErrorKind::Conflict,
            Self::Repository(_) => ErrorKind::Infrastructure,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines(_) => "INSUFFICIENT_LINES",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::DateOutsidePeriod { .. } => "DATE_OUTSIDE_PERIOD",
            Self::EntryInClosedPeriod(_) => "PERIOD_CLOSED",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::EmptyAccountCode => "EMPTY_ACCOUNT_CODE",
            Self::EmptyAccountName => "EMPTY_ACCOUNT_NAME",
            Self::InvalidParent(_) => "INVALID_PARENT_ACCOUNT",
            Self::InvalidDateWindow { .. } => "INVALID_DATE_WINDOW",
            Self::BalanceOverflow(_) => "BALANCE_OVERFLOW",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::Fiscal(err) => err.error_code(),
            Self::Repository(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Repository(err) => err.is_transient(),
            Self::Fiscal(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}
