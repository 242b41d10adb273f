//! Journal entry repository for database operations.
//!
//! Headers and lines are written in one transaction. Posting locks the
//! owning period row `FOR SHARE`, so a concurrent close either waits for the
//! post to commit or is seen by it.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use lekha_core::ledger::{
    EntryReference, JournalEntry, JournalLine, JournalRepository as JournalRepoTrait,
    JournalStatus, PostedLine,
};
use lekha_core::repository::RepositoryError;
use lekha_shared::types::{
    AccountId, ActorId, FiscalPeriodId, JournalEntryId, JournalLineId, TenantId,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::error::repository_error;
use crate::entities::{
    fiscal_periods, journal_entries, journal_lines,
    sea_orm_active_enums::JournalStatus as DbJournalStatus,
};

/// Posted lines of one account in a date window, in ledger order.
const POSTED_LINES_SQL: &str = r"
SELECT
    jl.id AS line_id,
    jl.entry_id,
    jl.account_id,
    jl.transaction_date,
    je.description AS entry_description,
    jl.description AS line_description,
    jl.debit,
    jl.credit
FROM journal_lines jl
JOIN journal_entries je ON je.id = jl.entry_id
WHERE jl.account_id = $1
  AND je.status = 'POSTED'
  AND jl.transaction_date BETWEEN $2 AND $3
ORDER BY jl.transaction_date, je.created_at, je.id, jl.line_no
";

/// Journal repository backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn lines_of<C: ConnectionTrait>(
        conn: &C,
        entry_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<JournalLine>>, RepositoryError> {
        let models = journal_lines::Entity::find()
            .filter(journal_lines::Column::EntryId.is_in(entry_ids))
            .order_by_asc(journal_lines::Column::EntryId)
            .order_by_asc(journal_lines::Column::LineNo)
            .all(conn)
            .await
            .map_err(repository_error)?;

        let mut grouped: HashMap<Uuid, Vec<JournalLine>> = HashMap::new();
        for model in models {
            grouped
                .entry(model.entry_id)
                .or_default()
                .push(line_from_model(model));
        }
        Ok(grouped)
    }
}

#[derive(Debug, FromQueryResult)]
struct PostedLineRow {
    line_id: Uuid,
    entry_id: Uuid,
    account_id: Uuid,
    transaction_date: NaiveDate,
    entry_description: String,
    line_description: Option<String>,
    debit: Decimal,
    credit: Decimal,
}

impl From<PostedLineRow> for PostedLine {
    fn from(row: PostedLineRow) -> Self {
        Self {
            line_id: JournalLineId::from_uuid(row.line_id),
            entry_id: JournalEntryId::from_uuid(row.entry_id),
            account_id: AccountId::from_uuid(row.account_id),
            transaction_date: row.transaction_date,
            entry_description: row.entry_description,
            line_description: row.line_description,
            debit: row.debit,
            credit: row.credit,
        }
    }
}

const fn to_db_status(status: JournalStatus) -> DbJournalStatus {
    match status {
        JournalStatus::Draft => DbJournalStatus::Draft,
        JournalStatus::Posted => DbJournalStatus::Posted,
    }
}

const fn from_db_status(status: DbJournalStatus) -> JournalStatus {
    match status {
        DbJournalStatus::Draft => JournalStatus::Draft,
        DbJournalStatus::Posted => JournalStatus::Posted,
    }
}

fn line_from_model(model: journal_lines::Model) -> JournalLine {
    JournalLine {
        id: JournalLineId::from_uuid(model.id),
        entry_id: JournalEntryId::from_uuid(model.entry_id),
        account_id: AccountId::from_uuid(model.account_id),
        debit: model.debit,
        credit: model.credit,
        description: model.description,
    }
}

fn entry_from_model(model: journal_entries::Model, lines: Vec<JournalLine>) -> JournalEntry {
    let reference = match (model.reference_id, model.reference_type) {
        (Some(id), Some(kind)) => Some(EntryReference { id, kind }),
        _ => None,
    };
    JournalEntry {
        id: JournalEntryId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        period_id: FiscalPeriodId::from_uuid(model.fiscal_period_id),
        transaction_date: model.transaction_date,
        description: model.description,
        status: from_db_status(model.status),
        reference,
        lines,
        created_by: ActorId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
        posted_at: model.posted_at.map(|at| at.with_timezone(&Utc)),
        posted_by: model.posted_by.map(ActorId::from_uuid),
    }
}

fn entry_to_active(entry: &JournalEntry) -> journal_entries::ActiveModel {
    journal_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        tenant_id: Set(entry.tenant_id.into_inner()),
        fiscal_period_id: Set(entry.period_id.into_inner()),
        transaction_date: Set(entry.transaction_date),
        description: Set(entry.description.clone()),
        status: Set(to_db_status(entry.status)),
        reference_id: Set(entry.reference.as_ref().map(|r| r.id)),
        reference_type: Set(entry.reference.as_ref().map(|r| r.kind.clone())),
        created_by: Set(entry.created_by.into_inner()),
        created_at: Set(entry.created_at.into()),
        posted_at: Set(entry.posted_at.map(Into::into)),
        posted_by: Set(entry.posted_by.map(ActorId::into_inner)),
    }
}

fn lines_to_active(entry: &JournalEntry) -> Vec<journal_lines::ActiveModel> {
    entry
        .lines
        .iter()
        .zip(1..)
        .map(|(line, line_no)| journal_lines::ActiveModel {
            id: Set(line.id.into_inner()),
            entry_id: Set(entry.id.into_inner()),
            line_no: Set(line_no),
            account_id: Set(line.account_id.into_inner()),
            transaction_date: Set(entry.transaction_date),
            debit: Set(line.debit),
            credit: Set(line.credit),
            description: Set(line.description.clone()),
        })
        .collect()
}

impl JournalRepoTrait for JournalRepository {
    async fn insert(&self, entry: JournalEntry) -> Result<JournalEntry, RepositoryError> {
        let txn = self.db.begin().await.map_err(repository_error)?;

        entry_to_active(&entry)
            .insert(&txn)
            .await
            .map_err(repository_error)?;
        journal_lines::Entity::insert_many(lines_to_active(&entry))
            .exec(&txn)
            .await
            .map_err(repository_error)?;

        txn.commit().await.map_err(repository_error)?;
        Ok(entry)
    }

    async fn find_by_id(
        &self,
        id: JournalEntryId,
    ) -> Result<Option<JournalEntry>, RepositoryError> {
        let Some(model) = journal_entries::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(repository_error)?
        else {
            return Ok(None);
        };
        let mut lines = Self::lines_of(&self.db, vec![model.id]).await?;
        let lines = lines.remove(&model.id).unwrap_or_default();
        Ok(Some(entry_from_model(model, lines)))
    }

    async fn list_by_period(
        &self,
        tenant_id: TenantId,
        period_id: FiscalPeriodId,
    ) -> Result<Vec<JournalEntry>, RepositoryError> {
        let models = journal_entries::Entity::find()
            .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(journal_entries::Column::FiscalPeriodId.eq(period_id.into_inner()))
            .order_by_asc(journal_entries::Column::TransactionDate)
            .order_by_asc(journal_entries::Column::CreatedAt)
            .order_by_asc(journal_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(repository_error)?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids = models.iter().map(|m| m.id).collect();
        let mut lines = Self::lines_of(&self.db, ids).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let entry_lines = lines.remove(&model.id).unwrap_or_default();
                entry_from_model(model, entry_lines)
            })
            .collect())
    }

    async fn mark_posted(
        &self,
        id: JournalEntryId,
        posted_by: ActorId,
        posted_at: DateTime<Utc>,
    ) -> Result<Option<JournalEntry>, RepositoryError> {
        let txn = self.db.begin().await.map_err(repository_error)?;

        let Some(entry) = journal_entries::Entity::find_by_id(id.into_inner())
            .filter(journal_entries::Column::Status.eq(DbJournalStatus::Draft))
            .one(&txn)
            .await
            .map_err(repository_error)?
        else {
            txn.rollback().await.map_err(repository_error)?;
            return Ok(None);
        };

        // Blocks a concurrent close until this transaction ends
        let open_period = fiscal_periods::Entity::find_by_id(entry.fiscal_period_id)
            .filter(fiscal_periods::Column::IsClosed.eq(false))
            .lock_shared()
            .one(&txn)
            .await
            .map_err(repository_error)?;
        if open_period.is_none() {
            debug!(entry_id = %id, "Period closed; entry left in draft");
            txn.rollback().await.map_err(repository_error)?;
            return Ok(None);
        }

        let updated = journal_entries::Entity::update_many()
            .set(journal_entries::ActiveModel {
                status: Set(DbJournalStatus::Posted),
                posted_at: Set(Some(posted_at.into())),
                posted_by: Set(Some(posted_by.into_inner())),
                ..Default::default()
            })
            .filter(journal_entries::Column::Id.eq(id.into_inner()))
            .filter(journal_entries::Column::Status.eq(DbJournalStatus::Draft))
            .exec_with_returning(&txn)
            .await
            .map_err(repository_error)?;
        let Some(model) = updated.into_iter().next() else {
            txn.rollback().await.map_err(repository_error)?;
            return Ok(None);
        };

        let mut lines = Self::lines_of(&txn, vec![model.id]).await?;
        txn.commit().await.map_err(repository_error)?;

        let entry_lines = lines.remove(&model.id).unwrap_or_default();
        Ok(Some(entry_from_model(model, entry_lines)))
    }

    async fn posted_lines(
        &self,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PostedLine>, RepositoryError> {
        let rows = PostedLineRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            POSTED_LINES_SQL,
            [account_id.into_inner().into(), from.into(), to.into()],
        ))
        .all(&self.db)
        .await
        .map_err(repository_error)?;
        Ok(rows.into_iter().map(PostedLine::from).collect())
    }
}
