//! In-process implementation of every repository trait.
//!
//! All state sits behind one mutex, so each trait method is a single atomic
//! step with the same guards as the PostgreSQL implementation. Useful for
//! tests and for embedding the engine without a database.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use lekha_shared::types::{AccountId, ActorId, FiscalPeriodId, JournalEntryId, TenantId};

use crate::fiscal::{DocumentType, FiscalPeriod, FiscalPeriodRepository, PeriodDeletion};
use crate::ledger::{
    Account, AccountRepository, JournalEntry, JournalRepository, JournalStatus, PostedLine,
};
use crate::repository::RepositoryError;

#[derive(Debug, Default)]
struct State {
    periods: HashMap<FiscalPeriodId, FiscalPeriod>,
    accounts: HashMap<AccountId, Account>,
    // insertion order is creation order
    entries: Vec<JournalEntry>,
}

impl State {
    fn entry_mut(&mut self, id: JournalEntryId) -> Option<&mut JournalEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    fn code_taken(&self, account: &Account) -> bool {
        self.accounts.values().any(|other| {
            other.id != account.id
                && other.tenant_id == account.tenant_id
                && other.code == account.code
        })
    }
}

/// Repository backend holding everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Backend("in-memory store lock poisoned".to_string()))
    }
}

impl FiscalPeriodRepository for InMemoryStore {
    async fn insert(&self, period: FiscalPeriod) -> Result<FiscalPeriod, RepositoryError> {
        let mut state = self.state()?;
        let duplicate = state
            .periods
            .values()
            .any(|p| p.tenant_id == period.tenant_id && p.name == period.name);
        if duplicate {
            return Err(RepositoryError::UniqueViolation(format!(
                "fiscal_periods (tenant_id, name) = ({}, {})",
                period.tenant_id, period.name
            )));
        }
        state.periods.insert(period.id, period.clone());
        Ok(period)
    }

    async fn find_by_id(
        &self,
        id: FiscalPeriodId,
    ) -> Result<Option<FiscalPeriod>, RepositoryError> {
        Ok(self.state()?.periods.get(&id).cloned())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<FiscalPeriod>, RepositoryError> {
        let mut periods: Vec<FiscalPeriod> = self
            .state()?
            .periods
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        periods.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(periods)
    }

    async fn find_current(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<FiscalPeriod>, RepositoryError> {
        Ok(self
            .state()?
            .periods
            .values()
            .find(|p| p.tenant_id == tenant_id && p.is_current)
            .cloned())
    }

    async fn set_current(
        &self,
        tenant_id: TenantId,
        id: FiscalPeriodId,
    ) -> Result<Option<FiscalPeriod>, RepositoryError> {
        let mut state = self.state()?;
        let exists = state
            .periods
            .get(&id)
            .is_some_and(|p| p.tenant_id == tenant_id);
        if !exists {
            return Ok(None);
        }
        let now = Utc::now();
        for period in state.periods.values_mut() {
            if period.tenant_id == tenant_id && period.is_current != (period.id == id) {
                period.is_current = period.id == id;
                period.updated_at = now;
            }
        }
        Ok(state.periods.get(&id).cloned())
    }

    async fn close(
        &self,
        id: FiscalPeriodId,
        closed_by: ActorId,
        closed_at: DateTime<Utc>,
    ) -> Result<Option<FiscalPeriod>, RepositoryError> {
        let mut state = self.state()?;
        Ok(state
            .periods
            .get_mut(&id)
            .filter(|p| !p.is_closed)
            .map(|p| {
                p.is_closed = true;
                p.closed_at = Some(closed_at);
                p.closed_by = Some(closed_by);
                p.updated_at = closed_at;
                p.clone()
            }))
    }

    async fn reopen(&self, id: FiscalPeriodId) -> Result<Option<FiscalPeriod>, RepositoryError> {
        let mut state = self.state()?;
        Ok(state
            .periods
            .get_mut(&id)
            .filter(|p| p.is_closed)
            .map(|p| {
                p.is_closed = false;
                p.closed_at = None;
                p.closed_by = None;
                p.updated_at = Utc::now();
                p.clone()
            }))
    }

    async fn delete_if_deletable(
        &self,
        id: FiscalPeriodId,
    ) -> Result<PeriodDeletion, RepositoryError> {
        let mut state = self.state()?;
        let outcome = match state.periods.get(&id) {
            None => PeriodDeletion::NotFound,
            Some(p) if p.is_current => PeriodDeletion::Current,
            Some(p) if p.is_closed => PeriodDeletion::Closed,
            Some(_) if state.entries.iter().any(|e| e.period_id == id) => {
                PeriodDeletion::HasEntries
            }
            Some(_) => PeriodDeletion::Deleted,
        };
        if outcome == PeriodDeletion::Deleted {
            state.periods.remove(&id);
        }
        Ok(outcome)
    }

    async fn increment_counter(
        &self,
        id: FiscalPeriodId,
        doc_type: DocumentType,
    ) -> Result<Option<i64>, RepositoryError> {
        let mut state = self.state()?;
        Ok(state
            .periods
            .get_mut(&id)
            .filter(|p| p.is_open())
            .map(|p| {
                p.updated_at = Utc::now();
                let counter = p.counter_mut(doc_type);
                *counter += 1;
                *counter
            }))
    }
}

impl AccountRepository for InMemoryStore {
    async fn insert(&self, account: Account) -> Result<Account, RepositoryError> {
        let mut state = self.state()?;
        if state.code_taken(&account) {
            return Err(RepositoryError::UniqueViolation(format!(
                "accounts (tenant_id, code) = ({}, {})",
                account.tenant_id, account.code
            )));
        }
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.state()?.accounts.get(&id).cloned())
    }

    async fn list_by_tenant(&self, tenant_id: TenantId) -> Result<Vec<Account>, RepositoryError> {
        let mut accounts: Vec<Account> = self
            .state()?
            .accounts
            .values()
            .filter(|a| a.tenant_id == tenant_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn update(&self, account: Account) -> Result<Option<Account>, RepositoryError> {
        let mut state = self.state()?;
        if !state.accounts.contains_key(&account.id) {
            return Ok(None);
        }
        if state.code_taken(&account) {
            return Err(RepositoryError::UniqueViolation(format!(
                "accounts (tenant_id, code) = ({}, {})",
                account.tenant_id, account.code
            )));
        }
        state.accounts.insert(account.id, account.clone());
        Ok(Some(account))
    }
}

impl JournalRepository for InMemoryStore {
    async fn insert(&self, entry: JournalEntry) -> Result<JournalEntry, RepositoryError> {
        let mut state = self.state()?;
        if state.entries.iter().any(|e| e.id == entry.id) {
            return Err(RepositoryError::UniqueViolation(format!(
                "journal_entries (id) = ({})",
                entry.id
            )));
        }
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_id(
        &self,
        id: JournalEntryId,
    ) -> Result<Option<JournalEntry>, RepositoryError> {
        Ok(self.state()?.entries.iter().find(|e| e.id == id).cloned())
    }

    async fn list_by_period(
        &self,
        tenant_id: TenantId,
        period_id: FiscalPeriodId,
    ) -> Result<Vec<JournalEntry>, RepositoryError> {
        let mut entries: Vec<JournalEntry> = self
            .state()?
            .entries
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.period_id == period_id)
            .cloned()
            .collect();
        // stable: equal dates keep creation order
        entries.sort_by_key(|e| e.transaction_date);
        Ok(entries)
    }

    async fn mark_posted(
        &self,
        id: JournalEntryId,
        posted_by: ActorId,
        posted_at: DateTime<Utc>,
    ) -> Result<Option<JournalEntry>, RepositoryError> {
        let mut state = self.state()?;
        let Some(period_id) = state
            .entries
            .iter()
            .find(|e| e.id == id && e.status == JournalStatus::Draft)
            .map(|e| e.period_id)
        else {
            return Ok(None);
        };
        if !state.periods.get(&period_id).is_some_and(FiscalPeriod::is_open) {
            return Ok(None);
        }
        Ok(state.entry_mut(id).map(|entry| {
            entry.status = JournalStatus::Posted;
            entry.posted_at = Some(posted_at);
            entry.posted_by = Some(posted_by);
            entry.clone()
        }))
    }

    async fn posted_lines(
        &self,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PostedLine>, RepositoryError> {
        let state = self.state()?;
        let mut lines: Vec<PostedLine> = state
            .entries
            .iter()
            .filter(|e| {
                e.status == JournalStatus::Posted
                    && e.transaction_date >= from
                    && e.transaction_date <= to
            })
            .flat_map(|entry| {
                entry
                    .lines
                    .iter()
                    .filter(|line| line.account_id == account_id)
                    .map(move |line| PostedLine {
                        line_id: line.id,
                        entry_id: entry.id,
                        account_id,
                        transaction_date: entry.transaction_date,
                        entry_description: entry.description.clone(),
                        line_description: line.description.clone(),
                        debit: line.debit,
                        credit: line.credit,
                    })
            })
            .collect();
        lines.sort_by_key(|line| line.transaction_date);
        Ok(lines)
    }
}
