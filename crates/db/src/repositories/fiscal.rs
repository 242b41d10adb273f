//! Fiscal period repository for database operations.
//!
//! Counter increments, closing and reopening are each a single conditional
//! `UPDATE`, so the guard and the write are one atomic step. Deletion locks
//! the period row first, which also holds off journal inserts referencing
//! it. Switching the current period runs in a transaction holding a
//! per-tenant advisory lock; the partial unique index on `is_current` backs
//! it up.

use chrono::{DateTime, Utc};
use lekha_core::fiscal::{
    DocumentType, FiscalPeriod, FiscalPeriodRepository as FiscalPeriodRepoTrait, PeriodDeletion,
};
use lekha_core::repository::RepositoryError;
use lekha_shared::types::{ActorId, FiscalPeriodId, TenantId};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::error::repository_error;
use crate::entities::{fiscal_periods, journal_entries};

/// Fiscal period repository backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct FiscalPeriodRepository {
    db: DatabaseConnection,
}

impl FiscalPeriodRepository {
    /// Creates a new fiscal period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Column holding the counter of a document type.
const fn counter_column(doc_type: DocumentType) -> fiscal_periods::Column {
    match doc_type {
        DocumentType::Invoice => fiscal_periods::Column::LastInvoiceNum,
        DocumentType::Purchase => fiscal_periods::Column::LastPurchaseNum,
        DocumentType::Voucher => fiscal_periods::Column::LastVoucherNum,
    }
}

fn period_from_model(model: fiscal_periods::Model) -> FiscalPeriod {
    FiscalPeriod {
        id: FiscalPeriodId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        name: model.name,
        start_date: model.start_date,
        end_date: model.end_date,
        start_date_bs: model.start_date_bs,
        end_date_bs: model.end_date_bs,
        is_current: model.is_current,
        is_closed: model.is_closed,
        closed_at: model.closed_at.map(|at| at.with_timezone(&Utc)),
        closed_by: model.closed_by.map(ActorId::from_uuid),
        invoice_prefix: model.invoice_prefix,
        purchase_prefix: model.purchase_prefix,
        voucher_prefix: model.voucher_prefix,
        last_invoice_num: model.last_invoice_num,
        last_purchase_num: model.last_purchase_num,
        last_voucher_num: model.last_voucher_num,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn period_to_active(period: FiscalPeriod) -> fiscal_periods::ActiveModel {
    fiscal_periods::ActiveModel {
        id: Set(period.id.into_inner()),
        tenant_id: Set(period.tenant_id.into_inner()),
        name: Set(period.name),
        start_date: Set(period.start_date),
        end_date: Set(period.end_date),
        start_date_bs: Set(period.start_date_bs),
        end_date_bs: Set(period.end_date_bs),
        is_current: Set(period.is_current),
        is_closed: Set(period.is_closed),
        closed_at: Set(period.closed_at.map(Into::into)),
        closed_by: Set(period.closed_by.map(ActorId::into_inner)),
        invoice_prefix: Set(period.invoice_prefix),
        purchase_prefix: Set(period.purchase_prefix),
        voucher_prefix: Set(period.voucher_prefix),
        last_invoice_num: Set(period.last_invoice_num),
        last_purchase_num: Set(period.last_purchase_num),
        last_voucher_num: Set(period.last_voucher_num),
        created_at: Set(period.created_at.into()),
        updated_at: Set(period.updated_at.into()),
    }
}

impl FiscalPeriodRepoTrait for FiscalPeriodRepository {
    async fn insert(&self, period: FiscalPeriod) -> Result<FiscalPeriod, RepositoryError> {
        let model = period_to_active(period)
            .insert(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(period_from_model(model))
    }

    async fn find_by_id(
        &self,
        id: FiscalPeriodId,
    ) -> Result<Option<FiscalPeriod>, RepositoryError> {
        let model = fiscal_periods::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(model.map(period_from_model))
    }

    async fn list_by_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<FiscalPeriod>, RepositoryError> {
        let models = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_desc(fiscal_periods::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(models.into_iter().map(period_from_model).collect())
    }

    async fn find_current(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<FiscalPeriod>, RepositoryError> {
        let model = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(fiscal_periods::Column::IsCurrent.eq(true))
            .one(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(model.map(period_from_model))
    }

    async fn set_current(
        &self,
        tenant_id: TenantId,
        id: FiscalPeriodId,
    ) -> Result<Option<FiscalPeriod>, RepositoryError> {
        let tenant = tenant_id.into_inner();
        let txn = self.db.begin().await.map_err(repository_error)?;

        // Serializes current-period switches per tenant until commit
        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))",
            [tenant.to_string().into()],
        ))
        .await
        .map_err(repository_error)?;

        let target = fiscal_periods::Entity::find_by_id(id.into_inner())
            .filter(fiscal_periods::Column::TenantId.eq(tenant))
            .one(&txn)
            .await
            .map_err(repository_error)?;
        if target.is_none() {
            txn.rollback().await.map_err(repository_error)?;
            return Ok(None);
        }

        // Unset before set: the partial unique index admits one current row
        fiscal_periods::Entity::update_many()
            .col_expr(fiscal_periods::Column::IsCurrent, Expr::value(false))
            .filter(fiscal_periods::Column::TenantId.eq(tenant))
            .filter(fiscal_periods::Column::IsCurrent.eq(true))
            .filter(fiscal_periods::Column::Id.ne(id.into_inner()))
            .exec(&txn)
            .await
            .map_err(repository_error)?;

        let updated = fiscal_periods::Entity::update_many()
            .col_expr(fiscal_periods::Column::IsCurrent, Expr::value(true))
            .filter(fiscal_periods::Column::Id.eq(id.into_inner()))
            .exec_with_returning(&txn)
            .await
            .map_err(repository_error)?;

        txn.commit().await.map_err(repository_error)?;
        debug!(tenant_id = %tenant_id, period_id = %id, "Current period switched");
        Ok(updated.into_iter().next().map(period_from_model))
    }

    async fn close(
        &self,
        id: FiscalPeriodId,
        closed_by: ActorId,
        closed_at: DateTime<Utc>,
    ) -> Result<Option<FiscalPeriod>, RepositoryError> {
        let closed_at: sea_orm::prelude::DateTimeWithTimeZone = closed_at.into();
        let updated = fiscal_periods::Entity::update_many()
            .col_expr(fiscal_periods::Column::IsClosed, Expr::value(true))
            .col_expr(fiscal_periods::Column::ClosedAt, Expr::value(closed_at))
            .col_expr(
                fiscal_periods::Column::ClosedBy,
                Expr::value(closed_by.into_inner()),
            )
            .filter(fiscal_periods::Column::Id.eq(id.into_inner()))
            .filter(fiscal_periods::Column::IsClosed.eq(false))
            .exec_with_returning(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(updated.into_iter().next().map(period_from_model))
    }

    async fn reopen(&self, id: FiscalPeriodId) -> Result<Option<FiscalPeriod>, RepositoryError> {
        let updated = fiscal_periods::Entity::update_many()
            .col_expr(fiscal_periods::Column::IsClosed, Expr::value(false))
            .col_expr(
                fiscal_periods::Column::ClosedAt,
                Expr::value(Option::<sea_orm::prelude::DateTimeWithTimeZone>::None),
            )
            .col_expr(
                fiscal_periods::Column::ClosedBy,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(fiscal_periods::Column::Id.eq(id.into_inner()))
            .filter(fiscal_periods::Column::IsClosed.eq(true))
            .exec_with_returning(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(updated.into_iter().next().map(period_from_model))
    }

    async fn delete_if_deletable(
        &self,
        id: FiscalPeriodId,
    ) -> Result<PeriodDeletion, RepositoryError> {
        let txn = self.db.begin().await.map_err(repository_error)?;

        let Some(period) = fiscal_periods::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(repository_error)?
        else {
            return Ok(PeriodDeletion::NotFound);
        };
        if period.is_current {
            return Ok(PeriodDeletion::Current);
        }
        if period.is_closed {
            return Ok(PeriodDeletion::Closed);
        }

        let entries = journal_entries::Entity::find()
            .filter(journal_entries::Column::FiscalPeriodId.eq(id.into_inner()))
            .count(&txn)
            .await
            .map_err(repository_error)?;
        if entries > 0 {
            debug!(entries, "Period still referenced by journal entries");
            return Ok(PeriodDeletion::HasEntries);
        }

        fiscal_periods::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await
            .map_err(repository_error)?;
        txn.commit().await.map_err(repository_error)?;
        Ok(PeriodDeletion::Deleted)
    }

    async fn increment_counter(
        &self,
        id: FiscalPeriodId,
        doc_type: DocumentType,
    ) -> Result<Option<i64>, RepositoryError> {
        let column = counter_column(doc_type);
        let updated = fiscal_periods::Entity::update_many()
            .col_expr(column, Expr::col(column).add(1))
            .filter(fiscal_periods::Column::Id.eq(id.into_inner()))
            .filter(fiscal_periods::Column::IsClosed.eq(false))
            .exec_with_returning(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(updated
            .into_iter()
            .next()
            .map(|model| period_from_model(model).last_number(doc_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_model_round_trip_keeps_every_field() {
        let mut period = FiscalPeriod::new(
            TenantId::new(),
            "2082/83",
            NaiveDate::from_ymd_opt(2025, 7, 16).unwrap(),
            NaiveDate::from_ymd_opt(2026, 7, 15).unwrap(),
            "2082-04-01".to_string(),
            "2083-03-32".to_string(),
        );
        period.is_closed = true;
        period.closed_by = Some(ActorId::new());
        period.closed_at = Some(Utc::now());
        period.last_voucher_num = 12;

        let active = period_to_active(period.clone());
        let model = fiscal_periods::Model {
            id: active.id.unwrap(),
            tenant_id: active.tenant_id.unwrap(),
            name: active.name.unwrap(),
            start_date: active.start_date.unwrap(),
            end_date: active.end_date.unwrap(),
            start_date_bs: active.start_date_bs.unwrap(),
            end_date_bs: active.end_date_bs.unwrap(),
            is_current: active.is_current.unwrap(),
            is_closed: active.is_closed.unwrap(),
            closed_at: active.closed_at.unwrap(),
            closed_by: active.closed_by.unwrap(),
            invoice_prefix: active.invoice_prefix.unwrap(),
            purchase_prefix: active.purchase_prefix.unwrap(),
            voucher_prefix: active.voucher_prefix.unwrap(),
            last_invoice_num: active.last_invoice_num.unwrap(),
            last_purchase_num: active.last_purchase_num.unwrap(),
            last_voucher_num: active.last_voucher_num.unwrap(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
        };

        assert_eq!(period_from_model(model), period);
    }

    #[test]
    fn test_counter_columns() {
        assert!(matches!(
            counter_column(DocumentType::Invoice),
            fiscal_periods::Column::LastInvoiceNum
        ));
        assert!(matches!(
            counter_column(DocumentType::Purchase),
            fiscal_periods::Column::LastPurchaseNum
        ));
        assert!(matches!(
            counter_column(DocumentType::Voucher),
            fiscal_periods::Column::LastVoucherNum
        ));
    }
}
