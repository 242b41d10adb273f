//! Running-balance ledger view over posted journal lines.
//!
//! The balance is the cumulative `debit - credit` seeded at zero, for every
//! account type. Opening balances from before the window are not carried in.

use std::sync::Arc;

use chrono::NaiveDate;
use lekha_shared::types::{AccountId, JournalEntryId, JournalLineId, TenantId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use super::error::LedgerError;
use super::repository::{AccountRepository, JournalRepository, PostedLine};

/// One row of a ledger projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// Source line.
    pub line_id: JournalLineId,
    /// Source entry.
    pub entry_id: JournalEntryId,
    /// Account projected.
    pub account_id: AccountId,
    /// Entry transaction date.
    pub transaction_date: NaiveDate,
    /// Entry narration.
    pub description: String,
    /// Line narration.
    pub line_description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after this row.
    pub running_balance: Decimal,
}

/// Materialized ledger of one account over a date window.
///
/// Built once per query; iterate it by reference or consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerProjection {
    /// Account projected.
    pub account_id: AccountId,
    /// First day of the window.
    pub from: NaiveDate,
    /// Last day of the window.
    pub to: NaiveDate,
    entries: Vec<LedgerEntry>,
}

impl LedgerProjection {
    /// Rows in ledger order.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no posted line fell in the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of debits in the window.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.entries.iter().map(|e| e.debit).sum()
    }

    /// Sum of credits in the window.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.entries.iter().map(|e| e.credit).sum()
    }

    /// Running balance after the last row, zero when empty.
    #[must_use]
    pub fn closing_balance(&self) -> Decimal {
        self.entries
            .last()
            .map_or(Decimal::ZERO, |e| e.running_balance)
    }
}

impl IntoIterator for LedgerProjection {
    type Item = LedgerEntry;
    type IntoIter = std::vec::IntoIter<LedgerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a LedgerProjection {
    type Item = &'a LedgerEntry;
    type IntoIter = std::slice::Iter<'a, LedgerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Folds ordered posted lines into ledger rows with a running balance.
///
/// # Errors
///
/// `BalanceOverflow` if the balance leaves the decimal range.
pub fn running_balances(
    lines: impl IntoIterator<Item = PostedLine>,
) -> Result<Vec<LedgerEntry>, LedgerError> {
    let mut balance = Decimal::ZERO;
    lines
        .into_iter()
        .map(|line| {
            balance = line
                .debit
                .checked_sub(line.credit)
                .and_then(|movement| balance.checked_add(movement))
                .ok_or(LedgerError::BalanceOverflow(line.account_id))?;
            Ok(LedgerEntry {
                line_id: line.line_id,
                entry_id: line.entry_id,
                account_id: line.account_id,
                transaction_date: line.transaction_date,
                description: line.entry_description,
                line_description: line.line_description,
                debit: line.debit,
                credit: line.credit,
                running_balance: balance,
            })
        })
        .collect()
}

/// Builds ledger projections for accounts.
pub struct LedgerProjector<J: JournalRepository, A: AccountRepository> {
    journals: Arc<J>,
    accounts: Arc<A>,
}

impl<J: JournalRepository, A: AccountRepository> LedgerProjector<J, A> {
    /// Creates a new ledger projector.
    #[must_use]
    pub fn new(journals: Arc<J>, accounts: Arc<A>) -> Self {
        Self { journals, accounts }
    }

    /// Projects the posted lines of an account dated within `[from, to]`.
    ///
    /// Draft entries never appear. Rows are ordered by transaction date,
    /// then by entry creation order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateWindow` if `from > to` and `AccountNotFound` if
    /// the account does not exist for the tenant.
    #[instrument(skip(self), fields(tenant_id = %tenant_id, account_id = %account_id))]
    pub async fn project(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<LedgerProjection, LedgerError> {
        if from > to {
            return Err(LedgerError::InvalidDateWindow { from, to });
        }
        self.accounts
            .find_by_id(account_id)
            .await?
            .filter(|account| account.tenant_id == tenant_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let lines = self.journals.posted_lines(account_id, from, to).await?;
        debug!(rows = lines.len(), "Posted lines loaded");

        Ok(LedgerProjection {
            account_id,
            from,
            to,
            entries: running_balances(lines)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(day: u32, debit: Decimal, credit: Decimal) -> PostedLine {
        PostedLine {
            line_id: JournalLineId::new(),
            entry_id: JournalEntryId::new(),
            account_id: account(),
            transaction_date: NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
            entry_description: format!("entry {day}"),
            line_description: None,
            debit,
            credit,
        }
    }

    fn account() -> AccountId {
        AccountId::from_uuid(uuid::Uuid::nil())
    }

    #[test]
    fn test_running_balance_is_debit_minus_credit() {
        let rows = running_balances(vec![
            line(1, dec!(500), dec!(0)),
            line(2, dec!(0), dec!(200)),
            line(3, dec!(50.25), dec!(0)),
        ])
        .unwrap();
        let balances: Vec<Decimal> = rows.iter().map(|r| r.running_balance).collect();
        assert_eq!(balances, vec![dec!(500), dec!(300), dec!(350.25)]);
        assert_eq!(rows[0].description, "entry 1");
    }

    #[test]
    fn test_empty_projection() {
        let projection = LedgerProjection {
            account_id: account(),
            from: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
            entries: running_balances(Vec::new()).unwrap(),
        };
        assert!(projection.is_empty());
        assert_eq!(projection.closing_balance(), Decimal::ZERO);
        assert_eq!(projection.total_debit(), Decimal::ZERO);
    }

    #[test]
    fn test_projection_totals_and_iteration() {
        let projection = LedgerProjection {
            account_id: account(),
            from: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
            entries: running_balances(vec![
                line(1, dec!(100), dec!(0)),
                line(5, dec!(0), dec!(300)),
            ])
            .unwrap(),
        };
        assert_eq!(projection.len(), 2);
        assert_eq!(projection.total_debit(), dec!(100));
        assert_eq!(projection.total_credit(), dec!(300));
        assert_eq!(projection.closing_balance(), dec!(-200));
        assert_eq!((&projection).into_iter().count(), 2);
        let consumed: Vec<LedgerEntry> = projection.into_iter().collect();
        assert_eq!(consumed[1].running_balance, dec!(-200));
    }

    #[test]
    fn test_running_balance_overflow_is_an_error() {
        let result = running_balances(vec![
            line(1, Decimal::MAX, dec!(0)),
            line(2, Decimal::MAX, dec!(0)),
        ]);
        assert!(matches!(result, Err(LedgerError::BalanceOverflow(id)) if id == account()));

        let result = running_balances(vec![
            line(1, dec!(0), Decimal::MAX),
            line(2, dec!(0), Decimal::MAX),
        ]);
        assert!(matches!(result, Err(LedgerError::BalanceOverflow(_))));
    }
}
