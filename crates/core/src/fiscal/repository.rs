//! Persistence contract for fiscal periods.

use std::future::Future;

use chrono::{DateTime, Utc};
use lekha_shared::types::{ActorId, FiscalPeriodId, TenantId};

use super::period::{DocumentType, FiscalPeriod};
use crate::repository::RepositoryError;

/// Outcome of [`FiscalPeriodRepository::delete_if_deletable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodDeletion {
    /// The period was removed.
    Deleted,
    /// No period has this ID.
    NotFound,
    /// The period is the tenant's current period.
    Current,
    /// The period is closed.
    Closed,
    /// Journal entries still reference the period.
    HasEntries,
}

/// Repository trait for fiscal period persistence.
///
/// Every state-changing method is a single conditional write: it applies
/// only when the guard in its description holds and reports why it did
/// not otherwise, so callers never read, decide and write in separate steps.
pub trait FiscalPeriodRepository: Send + Sync {
    /// Inserts a new period. Fails with `UniqueViolation` on a duplicate
    /// `(tenant_id, name)`.
    fn insert(
        &self,
        period: FiscalPeriod,
    ) -> impl Future<Output = Result<FiscalPeriod, RepositoryError>> + Send;

    /// Finds a period by ID.
    fn find_by_id(
        &self,
        id: FiscalPeriodId,
    ) -> impl Future<Output = Result<Option<FiscalPeriod>, RepositoryError>> + Send;

    /// Lists a tenant's periods, latest start date first.
    fn list_by_tenant(
        &self,
        tenant_id: TenantId,
    ) -> impl Future<Output = Result<Vec<FiscalPeriod>, RepositoryError>> + Send;

    /// Finds the tenant's current period.
    fn find_current(
        &self,
        tenant_id: TenantId,
    ) -> impl Future<Output = Result<Option<FiscalPeriod>, RepositoryError>> + Send;

    /// Makes `id` the tenant's only current period in one atomic unit,
    /// serialized against other calls for the same tenant.
    ///
    /// Returns `None` if the tenant has no such period.
    fn set_current(
        &self,
        tenant_id: TenantId,
        id: FiscalPeriodId,
    ) -> impl Future<Output = Result<Option<FiscalPeriod>, RepositoryError>> + Send;

    /// Closes the period if it is open.
    fn close(
        &self,
        id: FiscalPeriodId,
        closed_by: ActorId,
        closed_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<FiscalPeriod>, RepositoryError>> + Send;

    /// Reopens the period if it is closed, clearing the closing metadata.
    fn reopen(
        &self,
        id: FiscalPeriodId,
    ) -> impl Future<Output = Result<Option<FiscalPeriod>, RepositoryError>> + Send;

    /// Deletes the period if it is neither current nor closed and no
    /// journal entry references it.
    fn delete_if_deletable(
        &self,
        id: FiscalPeriodId,
    ) -> impl Future<Output = Result<PeriodDeletion, RepositoryError>> + Send;

    /// Increments the counter for `doc_type` if the period is open and
    /// returns the new value.
    fn increment_counter(
        &self,
        id: FiscalPeriodId,
        doc_type: DocumentType,
    ) -> impl Future<Output = Result<Option<i64>, RepositoryError>> + Send;
}
