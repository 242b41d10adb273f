//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Chart of accounts and its maintenance service
//! - Journal entries with the double-entry invariant
//! - Draft to posted transitions gated on the fiscal period
//! - Running-balance ledger projections

pub mod account;
pub mod account_service;
pub mod error;
pub mod journal;
pub mod projection;
pub mod repository;
pub mod service;
pub mod validation;

#[cfg(test)]
mod service_tests;
#[cfg(test)]
mod validation_props;

pub use account::{Account, AccountType, CreateAccountInput, UpdateAccountInput};
pub use account_service::AccountService;
pub use error::LedgerError;
pub use journal::{
    CreateJournalEntryInput, EntryReference, JournalEntry, JournalLine, JournalLineInput,
    JournalStatus,
};
pub use projection::{LedgerEntry, LedgerProjection, LedgerProjector, running_balances};
pub use repository::{AccountRepository, JournalRepository, PostedLine};
pub use service::JournalService;
pub use validation::{AMOUNT_SCALE, BALANCE_TOLERANCE, LineTotals, MAX_AMOUNT, validate_lines};
