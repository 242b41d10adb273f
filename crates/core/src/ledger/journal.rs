//! Journal entry aggregate: a header with its balanced lines.

use chrono::{DateTime, NaiveDate, Utc};
use lekha_shared::types::{AccountId, ActorId, FiscalPeriodId, JournalEntryId, JournalLineId, TenantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Journal entry status. Entries move from `Draft` to `Posted` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalStatus {
    /// Recorded, not yet part of the ledger.
    Draft,
    /// Part of the ledger (immutable).
    Posted,
}

impl JournalStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Posted => "POSTED",
        }
    }
}

/// Business document that produced an entry, such as an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReference {
    /// Identifier of the source document.
    pub id: Uuid,
    /// Kind of source document (e.g. "INVOICE").
    pub kind: String,
}

/// One debit/credit line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier.
    pub id: JournalLineId,
    /// Owning entry.
    pub entry_id: JournalEntryId,
    /// Account affected.
    pub account_id: AccountId,
    /// Debit amount (>= 0).
    pub debit: Decimal,
    /// Credit amount (>= 0).
    pub credit: Decimal,
    /// Line narration.
    pub description: Option<String>,
}

/// A journal entry with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Fiscal period the entry belongs to.
    pub period_id: FiscalPeriodId,
    /// Date the transaction took place.
    pub transaction_date: NaiveDate,
    /// Narration.
    pub description: String,
    /// Lifecycle status.
    pub status: JournalStatus,
    /// Source document, if any.
    pub reference: Option<EntryReference>,
    /// Lines, in entry order.
    pub lines: Vec<JournalLine>,
    /// Who recorded the entry.
    pub created_by: ActorId,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Who posted the entry.
    pub posted_by: Option<ActorId>,
}

impl JournalEntry {
    /// Sum of line debits.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sum of line credits.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Returns true once posted.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        self.status == JournalStatus::Posted
    }
}

/// Input for one line of a new journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLineInput {
    /// Account affected.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line narration.
    pub description: Option<String>,
}

impl JournalLineInput {
    /// A pure debit line.
    #[must_use]
    pub const fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// A pure credit line.
    #[must_use]
    pub const fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Sets the line narration.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone)]
pub struct CreateJournalEntryInput {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Target fiscal period.
    pub period_id: FiscalPeriodId,
    /// Date the transaction took place.
    pub transaction_date: NaiveDate,
    /// Narration.
    pub description: String,
    /// Source document, if any.
    pub reference: Option<EntryReference>,
    /// Lines, in entry order.
    pub lines: Vec<JournalLineInput>,
    /// Who records the entry.
    pub created_by: ActorId,
}
