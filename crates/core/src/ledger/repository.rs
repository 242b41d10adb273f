//! Persistence contracts for accounts and journal entries.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use lekha_shared::types::{
    AccountId, ActorId, FiscalPeriodId, JournalEntryId, JournalLineId, TenantId,
};
use rust_decimal::Decimal;

use super::account::Account;
use super::journal::JournalEntry;
use crate::repository::RepositoryError;

/// A posted journal line joined with its entry header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedLine {
    /// Line ID.
    pub line_id: JournalLineId,
    /// Entry ID.
    pub entry_id: JournalEntryId,
    /// Account affected.
    pub account_id: AccountId,
    /// Entry transaction date.
    pub transaction_date: NaiveDate,
    /// Entry narration.
    pub entry_description: String,
    /// Line narration.
    pub line_description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// Repository trait for the chart of accounts.
pub trait AccountRepository: Send + Sync {
    /// Inserts an account. Fails with `UniqueViolation` on a duplicate
    /// `(tenant_id, code)`.
    fn insert(
        &self,
        account: Account,
    ) -> impl Future<Output = Result<Account, RepositoryError>> + Send;

    /// Finds an account by ID.
    fn find_by_id(
        &self,
        id: AccountId,
    ) -> impl Future<Output = Result<Option<Account>, RepositoryError>> + Send;

    /// Lists a tenant's accounts ordered by code.
    fn list_by_tenant(
        &self,
        tenant_id: TenantId,
    ) -> impl Future<Output = Result<Vec<Account>, RepositoryError>> + Send;

    /// Replaces an existing account. Returns `None` if it does not exist and
    /// fails with `UniqueViolation` if the new code is taken.
    fn update(
        &self,
        account: Account,
    ) -> impl Future<Output = Result<Option<Account>, RepositoryError>> + Send;
}

/// Repository trait for journal entries.
pub trait JournalRepository: Send + Sync {
    /// Persists the header and all lines in one atomic unit.
    fn insert(
        &self,
        entry: JournalEntry,
    ) -> impl Future<Output = Result<JournalEntry, RepositoryError>> + Send;

    /// Finds an entry, with its lines, by ID.
    fn find_by_id(
        &self,
        id: JournalEntryId,
    ) -> impl Future<Output = Result<Option<JournalEntry>, RepositoryError>> + Send;

    /// Lists a tenant's entries in a period, by transaction date then
    /// creation order.
    fn list_by_period(
        &self,
        tenant_id: TenantId,
        period_id: FiscalPeriodId,
    ) -> impl Future<Output = Result<Vec<JournalEntry>, RepositoryError>> + Send;

    /// Moves a draft entry to posted, but only while its period is open.
    ///
    /// Returns `None` without changing anything when the entry is missing,
    /// already posted, or its period is closed.
    fn mark_posted(
        &self,
        id: JournalEntryId,
        posted_by: ActorId,
        posted_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<JournalEntry>, RepositoryError>> + Send;

    /// Posted lines of an account with transaction dates in `[from, to]`,
    /// ordered by transaction date, then entry creation order, then line order.
    fn posted_lines(
        &self,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<PostedLine>, RepositoryError>> + Send;
}
