//! Chart of accounts types.

use chrono::{DateTime, Utc};
use lekha_shared::types::{AccountId, TenantId};
use serde::{Deserialize, Serialize};

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "ASSET",
            Self::Liability => "LIABILITY",
            Self::Equity => "EQUITY",
            Self::Revenue => "REVENUE",
            Self::Expense => "EXPENSE",
        }
    }
}

/// An entry in a tenant's chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Code, unique per tenant (e.g. "1100").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Parent account for grouping.
    pub parent_id: Option<AccountId>,
    /// Inactive accounts cannot receive new journal lines.
    pub is_active: bool,
    /// Free-form description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Parent account.
    pub parent_id: Option<AccountId>,
    /// Free-form description.
    pub description: Option<String>,
}

/// Changes applied by an account update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New code.
    pub code: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New parent; `Some(None)` detaches the account.
    pub parent_id: Option<Option<AccountId>>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
}
