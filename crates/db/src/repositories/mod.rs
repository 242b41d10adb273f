//! `PostgreSQL` implementations of the core repository traits.
//!
//! Each repository wraps a pooled `DatabaseConnection`. Conditional writes
//! (counter increments, posting, closing) are single statements or short
//! transactions, so the services stay correct under concurrent callers.

mod error;

pub mod account;
pub mod fiscal;
pub mod journal;

pub use account::AccountRepository;
pub use fiscal::FiscalPeriodRepository;
pub use journal::JournalRepository;
