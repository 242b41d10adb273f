//! Chart of accounts repository for database operations.

use chrono::Utc;
use lekha_core::ledger::{Account, AccountRepository as AccountRepoTrait, AccountType};
use lekha_core::repository::RepositoryError;
use lekha_shared::types::{AccountId, TenantId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use super::error::repository_error;
use crate::entities::{accounts, sea_orm_active_enums::AccountType as DbAccountType};

/// Account repository backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) const fn to_db_account_type(account_type: AccountType) -> DbAccountType {
    match account_type {
        AccountType::Asset => DbAccountType::Asset,
        AccountType::Liability => DbAccountType::Liability,
        AccountType::Equity => DbAccountType::Equity,
        AccountType::Revenue => DbAccountType::Revenue,
        AccountType::Expense => DbAccountType::Expense,
    }
}

pub(crate) const fn from_db_account_type(account_type: DbAccountType) -> AccountType {
    match account_type {
        DbAccountType::Asset => AccountType::Asset,
        DbAccountType::Liability => AccountType::Liability,
        DbAccountType::Equity => AccountType::Equity,
        DbAccountType::Revenue => AccountType::Revenue,
        DbAccountType::Expense => AccountType::Expense,
    }
}

fn account_from_model(model: accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        code: model.code,
        name: model.name,
        account_type: from_db_account_type(model.account_type),
        parent_id: model.parent_id.map(AccountId::from_uuid),
        is_active: model.is_active,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn account_to_active(account: Account) -> accounts::ActiveModel {
    accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        tenant_id: Set(account.tenant_id.into_inner()),
        code: Set(account.code),
        name: Set(account.name),
        account_type: Set(to_db_account_type(account.account_type)),
        parent_id: Set(account.parent_id.map(AccountId::into_inner)),
        is_active: Set(account.is_active),
        description: Set(account.description),
        created_at: Set(account.created_at.into()),
        updated_at: Set(account.updated_at.into()),
    }
}

impl AccountRepoTrait for AccountRepository {
    async fn insert(&self, account: Account) -> Result<Account, RepositoryError> {
        let model = account_to_active(account)
            .insert(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(account_from_model(model))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(model.map(account_from_model))
    }

    async fn list_by_tenant(&self, tenant_id: TenantId) -> Result<Vec<Account>, RepositoryError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(models.into_iter().map(account_from_model).collect())
    }

    async fn update(&self, account: Account) -> Result<Option<Account>, RepositoryError> {
        // tenant and creation time never change
        let mut active = account_to_active(account);
        active.tenant_id = sea_orm::ActiveValue::NotSet;
        active.created_at = sea_orm::ActiveValue::NotSet;

        match active.update(&self.db).await {
            Ok(model) => Ok(Some(account_from_model(model))),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(repository_error(err)),
        }
    }
}
