//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::fiscal_periods::Entity as FiscalPeriods;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_lines::Entity as JournalLines;
