//! Journal entry recording and posting.
//!
//! Entries are recorded as drafts after their period, accounts and balance
//! have been checked, and become part of the ledger when posted. Posting is
//! gated on the owning period being open at the moment of the write.

use std::sync::Arc;

use chrono::Utc;
use lekha_shared::types::{
    ActorId, FiscalPeriodId, JournalEntryId, JournalLineId, TenantId,
};
use tracing::{debug, info, instrument};

use super::error::LedgerError;
use super::journal::{CreateJournalEntryInput, JournalEntry, JournalLine, JournalStatus};
use super::repository::{AccountRepository, JournalRepository};
use super::validation::validate_lines;
use crate::fiscal::{FiscalError, FiscalPeriodRepository, PeriodService};

/// Service for recording and posting journal entries.
pub struct JournalService<J, A, P>
where
    J: JournalRepository,
    A: AccountRepository,
    P: FiscalPeriodRepository,
{
    journals: Arc<J>,
    accounts: Arc<A>,
    periods: Arc<PeriodService<P>>,
}

impl<J, A, P> JournalService<J, A, P>
where
    J: JournalRepository,
    A: AccountRepository,
    P: FiscalPeriodRepository,
{
    /// Creates a new journal service.
    #[must_use]
    pub fn new(journals: Arc<J>, accounts: Arc<A>, periods: Arc<PeriodService<P>>) -> Self {
        Self {
            journals,
            accounts,
            periods,
        }
    }

    /// Records a draft journal entry.
    ///
    /// Checks run in this order:
    /// 1. The period exists for the tenant, is open and contains the date
    /// 2. Every referenced account exists for the tenant and is active
    /// 3. The lines satisfy the double-entry invariant
    ///
    /// Header and lines are then persisted together.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, or a repository error.
    #[instrument(
        skip(self, input),
        fields(tenant_id = %input.tenant_id, period_id = %input.period_id)
    )]
    pub async fn create(&self, input: CreateJournalEntryInput) -> Result<JournalEntry, LedgerError> {
        let period = self.periods.get(input.period_id).await?;
        if period.tenant_id != input.tenant_id {
            return Err(FiscalError::PeriodNotFound(input.period_id).into());
        }
        if period.is_closed {
            return Err(LedgerError::EntryInClosedPeriod(period.id));
        }
        if !period.contains_date(input.transaction_date) {
            return Err(LedgerError::DateOutsidePeriod {
                date: input.transaction_date,
                start: period.start_date,
                end: period.end_date,
            });
        }

        for line in &input.lines {
            let account = self
                .accounts
                .find_by_id(line.account_id)
                .await?
                .filter(|account| account.tenant_id == input.tenant_id)
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            if !account.is_active {
                return Err(LedgerError::AccountInactive(account.id));
            }
        }

        let totals = validate_lines(&input.lines)?;

        let entry_id = JournalEntryId::new();
        let entry = JournalEntry {
            id: entry_id,
            tenant_id: input.tenant_id,
            period_id: input.period_id,
            transaction_date: input.transaction_date,
            description: input.description,
            status: JournalStatus::Draft,
            reference: input.reference,
            lines: input
                .lines
                .into_iter()
                .map(|line| JournalLine {
                    id: JournalLineId::new(),
                    entry_id,
                    account_id: line.account_id,
                    debit: line.debit,
                    credit: line.credit,
                    description: line.description,
                })
                .collect(),
            created_by: input.created_by,
            created_at: Utc::now(),
            posted_at: None,
            posted_by: None,
        };

        let entry = self.journals.insert(entry).await?;
        info!(
            entry_id = %entry.id,
            lines = entry.lines.len(),
            debit = %totals.debit,
            credit = %totals.credit,
            "Journal entry recorded"
        );
        Ok(entry)
    }

    /// Posts a draft entry to the ledger.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the entry does not exist
    /// - `AlreadyPosted` if it was posted before (or concurrently)
    /// - `Fiscal(PeriodClosed)` if its period is closed
    #[instrument(skip(self), fields(entry_id = %id, actor = %posted_by))]
    pub async fn post(
        &self,
        id: JournalEntryId,
        posted_by: ActorId,
    ) -> Result<JournalEntry, LedgerError> {
        let entry = self
            .journals
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        if entry.is_posted() {
            return Err(LedgerError::AlreadyPosted(id));
        }
        self.periods.ensure_open(entry.period_id).await?;

        if let Some(posted) = self.journals.mark_posted(id, posted_by, Utc::now()).await? {
            info!("Journal entry posted");
            return Ok(posted);
        }

        // lost a race: find out against what
        debug!("Conditional post did not apply");
        let current = self
            .journals
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        if current.is_posted() {
            return Err(LedgerError::AlreadyPosted(id));
        }
        Err(FiscalError::PeriodClosed(current.period_id).into())
    }

    /// Gets an entry of the tenant.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist or belongs to
    /// another tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        id: JournalEntryId,
    ) -> Result<JournalEntry, LedgerError> {
        self.journals
            .find_by_id(id)
            .await?
            .filter(|entry| entry.tenant_id == tenant_id)
            .ok_or(LedgerError::EntryNotFound(id))
    }

    /// Lists the tenant's entries in a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        period_id: FiscalPeriodId,
    ) -> Result<Vec<JournalEntry>, LedgerError> {
        Ok(self.journals.list_by_period(tenant_id, period_id).await?)
    }
}
