//! Chart of accounts maintenance.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use lekha_shared::types::{AccountId, TenantId};
use tracing::{info, instrument};

use super::account::{Account, CreateAccountInput, UpdateAccountInput};
use super::error::LedgerError;
use super::repository::AccountRepository;
use crate::repository::RepositoryError;

/// Service for creating and maintaining accounts.
pub struct AccountService<A: AccountRepository> {
    repo: Arc<A>,
}

impl<A: AccountRepository> AccountService<A> {
    /// Creates a new account service.
    #[must_use]
    pub fn new(repo: Arc<A>) -> Self {
        Self { repo }
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the code or name is blank
    /// - the parent account does not belong to the tenant
    /// - the code is already used by the tenant
    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id, code = %input.code))]
    pub async fn create(&self, input: CreateAccountInput) -> Result<Account, LedgerError> {
        let code = input.code.trim().to_string();
        let name = input.name.trim().to_string();
        if code.is_empty() {
            return Err(LedgerError::EmptyAccountCode);
        }
        if name.is_empty() {
            return Err(LedgerError::EmptyAccountName);
        }
        if let Some(parent_id) = input.parent_id {
            self.ensure_parent(input.tenant_id, None, parent_id).await?;
        }

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            tenant_id: input.tenant_id,
            code: code.clone(),
            name,
            account_type: input.account_type,
            parent_id: input.parent_id,
            is_active: true,
            description: input.description,
            created_at: now,
            updated_at: now,
        };

        let account = self
            .repo
            .insert(account)
            .await
            .map_err(|err| duplicate_code(err, code))?;
        info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    /// Gets an account of the tenant.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist or belongs
    /// to another tenant.
    pub async fn get(&self, tenant_id: TenantId, id: AccountId) -> Result<Account, LedgerError> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|account| account.tenant_id == tenant_id)
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Lists the tenant's accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list(&self, tenant_id: TenantId) -> Result<Vec<Account>, LedgerError> {
        Ok(self.repo.list_by_tenant(tenant_id).await?)
    }

    /// Applies changes to an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, a validation error for blank fields or an
    /// invalid parent, or `DuplicateAccountCode`.
    #[instrument(skip(self, changes), fields(tenant_id = %tenant_id, account_id = %id))]
    pub async fn update(
        &self,
        tenant_id: TenantId,
        id: AccountId,
        changes: UpdateAccountInput,
    ) -> Result<Account, LedgerError> {
        let mut account = self.get(tenant_id, id).await?;

        if let Some(code) = changes.code {
            let code = code.trim().to_string();
            if code.is_empty() {
                return Err(LedgerError::EmptyAccountCode);
            }
            account.code = code;
        }
        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(LedgerError::EmptyAccountName);
            }
            account.name = name;
        }
        if let Some(description) = changes.description {
            account.description = description;
        }
        if let Some(parent_id) = changes.parent_id {
            if let Some(parent_id) = parent_id {
                self.ensure_parent(tenant_id, Some(id), parent_id).await?;
            }
            account.parent_id = parent_id;
        }
        if let Some(is_active) = changes.is_active {
            account.is_active = is_active;
        }
        account.updated_at = Utc::now();

        let code = account.code.clone();
        let account = self
            .repo
            .update(account)
            .await
            .map_err(|err| duplicate_code(err, code))?
            .ok_or(LedgerError::AccountNotFound(id))?;
        info!("Account updated");
        Ok(account)
    }

    /// Checks that `parent_id` is an account of the tenant and that `child`
    /// does not appear among its ancestors.
    async fn ensure_parent(
        &self,
        tenant_id: TenantId,
        child: Option<AccountId>,
        parent_id: AccountId,
    ) -> Result<(), LedgerError> {
        let invalid = || LedgerError::InvalidParent(parent_id);
        let parent = self
            .repo
            .find_by_id(parent_id)
            .await?
            .filter(|parent| parent.tenant_id == tenant_id)
            .ok_or_else(invalid)?;
        let Some(child) = child else {
            return Ok(());
        };

        let mut seen = HashSet::from([parent.id]);
        let mut next = Some(parent);
        while let Some(account) = next {
            if account.id == child {
                return Err(invalid());
            }
            next = match account.parent_id {
                Some(id) if seen.insert(id) => self.repo.find_by_id(id).await?,
                // root reached, or a stored loop that does not pass `child`
                _ => None,
            };
        }
        Ok(())
    }
}

fn duplicate_code(err: RepositoryError, code: String) -> LedgerError {
    match err {
        RepositoryError::UniqueViolation(_) => LedgerError::DuplicateAccountCode(code),
        other => LedgerError::Repository(other),
    }
}
