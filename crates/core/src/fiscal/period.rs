//! Fiscal period entity and document numbering rules.

use chrono::{DateTime, NaiveDate, Utc};
use lekha_shared::types::{ActorId, FiscalPeriodId, TenantId};
use serde::{Deserialize, Serialize};

/// Business documents numbered per fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Sales invoice.
    Invoice,
    /// Purchase bill.
    Purchase,
    /// Journal voucher.
    Voucher,
}

impl DocumentType {
    /// All document types, in prefix order.
    pub const ALL: [Self; 3] = [Self::Invoice, Self::Purchase, Self::Voucher];

    /// Code that starts every number of this type.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Invoice => "INV",
            Self::Purchase => "PUR",
            Self::Voucher => "JV",
        }
    }
}

/// Compact year code used in prefixes: `"2082/83"` becomes `"8283"`.
///
/// Takes characters 2-3 and 5-6 of the name. Names shorter than seven
/// characters are used verbatim.
#[must_use]
pub fn year_code(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() < 7 {
        return name.to_string();
    }
    chars[2..4].iter().chain(&chars[5..7]).collect()
}

/// Prefix for documents of `doc_type` in the period called `name`.
#[must_use]
pub fn document_prefix(doc_type: DocumentType, name: &str) -> String {
    format!("{}-{}-", doc_type.code(), year_code(name))
}

/// Renders a document number: the prefix followed by the counter padded to 4 digits.
#[must_use]
pub fn format_document_number(prefix: &str, counter: i64) -> String {
    format!("{prefix}{counter:04}")
}

/// A named accounting period with dual-calendar boundaries.
///
/// At most one period per tenant is current. Counters only move forward
/// and only while the period is open; prefixes never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Name, unique per tenant (e.g. "2082/83").
    pub name: String,
    /// First Gregorian day of the period.
    pub start_date: NaiveDate,
    /// Last Gregorian day of the period.
    pub end_date: NaiveDate,
    /// Start in Bikram Sambat, as displayed.
    pub start_date_bs: String,
    /// End in Bikram Sambat, as displayed.
    pub end_date_bs: String,
    /// Whether this is the tenant's current period.
    pub is_current: bool,
    /// Whether the period is closed.
    pub is_closed: bool,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Who closed the period.
    pub closed_by: Option<ActorId>,
    /// Prefix of invoice numbers.
    pub invoice_prefix: String,
    /// Prefix of purchase numbers.
    pub purchase_prefix: String,
    /// Prefix of voucher numbers.
    pub voucher_prefix: String,
    /// Last issued invoice counter.
    pub last_invoice_num: i64,
    /// Last issued purchase counter.
    pub last_purchase_num: i64,
    /// Last issued voucher counter.
    pub last_voucher_num: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl FiscalPeriod {
    /// Creates an open, non-current period with zeroed counters.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_date_bs: String,
        end_date_bs: String,
    ) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: FiscalPeriodId::new(),
            tenant_id,
            invoice_prefix: document_prefix(DocumentType::Invoice, &name),
            purchase_prefix: document_prefix(DocumentType::Purchase, &name),
            voucher_prefix: document_prefix(DocumentType::Voucher, &name),
            name,
            start_date,
            end_date,
            start_date_bs,
            end_date_bs,
            is_current: false,
            is_closed: false,
            closed_at: None,
            closed_by: None,
            last_invoice_num: 0,
            last_purchase_num: 0,
            last_voucher_num: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if documents may be numbered and entries posted.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.is_closed
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Prefix for the given document type.
    #[must_use]
    pub fn prefix(&self, doc_type: DocumentType) -> &str {
        match doc_type {
            DocumentType::Invoice => &self.invoice_prefix,
            DocumentType::Purchase => &self.purchase_prefix,
            DocumentType::Voucher => &self.voucher_prefix,
        }
    }

    /// Last issued counter for the given document type.
    #[must_use]
    pub const fn last_number(&self, doc_type: DocumentType) -> i64 {
        match doc_type {
            DocumentType::Invoice => self.last_invoice_num,
            DocumentType::Purchase => self.last_purchase_num,
            DocumentType::Voucher => self.last_voucher_num,
        }
    }

    /// Mutable access to the counter for the given document type.
    pub fn counter_mut(&mut self, doc_type: DocumentType) -> &mut i64 {
        match doc_type {
            DocumentType::Invoice => &mut self.last_invoice_num,
            DocumentType::Purchase => &mut self.last_purchase_num,
            DocumentType::Voucher => &mut self.last_voucher_num,
        }
    }
}
