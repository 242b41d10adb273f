//! Fiscal period lifecycle and document numbering.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use lekha_shared::config::NumberingConfig;
use lekha_shared::types::{ActorId, FiscalPeriodId, TenantId};
use tracing::{info, instrument, warn};

use super::error::FiscalError;
use super::period::{DocumentType, FiscalPeriod, format_document_number};
use super::repository::{FiscalPeriodRepository, PeriodDeletion};
use crate::calendar::{fiscal_year_bounds, to_bs};
use crate::repository::RepositoryError;

/// Service managing fiscal periods for all tenants.
///
/// Constructed once at startup and shared; every state change is delegated
/// to a conditional write in the repository.
pub struct PeriodService<R: FiscalPeriodRepository> {
    repo: Arc<R>,
    max_increment_retries: u32,
}

impl<R: FiscalPeriodRepository> PeriodService<R> {
    /// Creates a period service with the default numbering settings.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self::with_numbering(repo, &NumberingConfig::default())
    }

    /// Creates a period service with explicit numbering settings.
    #[must_use]
    pub fn with_numbering(repo: Arc<R>, numbering: &NumberingConfig) -> Self {
        Self {
            repo,
            max_increment_retries: numbering.max_increment_retries,
        }
    }

    /// Creates a period from Gregorian boundaries.
    ///
    /// The Bikram Sambat boundaries are derived from the Gregorian dates and
    /// the document prefixes from the name.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the name is blank
    /// - `start_date` is not before `end_date`
    /// - either date is outside the supported calendar range
    /// - the tenant already has a period with this name
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn create(
        &self,
        tenant_id: TenantId,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<FiscalPeriod, FiscalError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FiscalError::EmptyName);
        }
        if start_date >= end_date {
            return Err(FiscalError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        let start_bs = to_bs(start_date)?;
        let end_bs = to_bs(end_date)?;
        let period = FiscalPeriod::new(
            tenant_id,
            name,
            start_date,
            end_date,
            start_bs.to_string(),
            end_bs.to_string(),
        );
        self.insert(period).await
    }

    /// Creates a period from a `YYYY/YY` fiscal year name.
    ///
    /// The period runs from Shrawan 1 of the first year to the end of Ashad
    /// of the second; the BS end is stored as the `YYYY-03-32` marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed, its years are outside the
    /// supported calendar range, or the tenant already uses it.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn create_from_name(
        &self,
        tenant_id: TenantId,
        name: &str,
    ) -> Result<FiscalPeriod, FiscalError> {
        let bounds = fiscal_year_bounds(name.trim())?;
        let period = FiscalPeriod::new(
            tenant_id,
            bounds.name,
            bounds.start_date,
            bounds.end_date,
            bounds.start_bs.to_string(),
            bounds.end_bs.to_string(),
        );
        self.insert(period).await
    }

    async fn insert(&self, period: FiscalPeriod) -> Result<FiscalPeriod, FiscalError> {
        let name = period.name.clone();
        let period = self.repo.insert(period).await.map_err(|err| match err {
            RepositoryError::UniqueViolation(_) => FiscalError::DuplicateName(name),
            other => FiscalError::Repository(other),
        })?;
        info!(
            period_id = %period.id,
            name = %period.name,
            start = %period.start_date,
            end = %period.end_date,
            "Fiscal period created"
        );
        Ok(period)
    }

    /// Gets a period by ID.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if the period does not exist.
    pub async fn get(&self, id: FiscalPeriodId) -> Result<FiscalPeriod, FiscalError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(FiscalError::PeriodNotFound(id))
    }

    /// Lists a tenant's periods, latest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list(&self, tenant_id: TenantId) -> Result<Vec<FiscalPeriod>, FiscalError> {
        Ok(self.repo.list_by_tenant(tenant_id).await?)
    }

    /// Gets the tenant's current period, if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn current(&self, tenant_id: TenantId) -> Result<Option<FiscalPeriod>, FiscalError> {
        Ok(self.repo.find_current(tenant_id).await?)
    }

    /// Gets a period and checks that it is open.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` or `PeriodClosed`.
    pub async fn ensure_open(&self, id: FiscalPeriodId) -> Result<FiscalPeriod, FiscalError> {
        let period = self.get(id).await?;
        if period.is_closed {
            return Err(FiscalError::PeriodClosed(id));
        }
        Ok(period)
    }

    /// Makes a period the tenant's current one, un-setting the previous one.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if the tenant has no such period.
    #[instrument(skip(self), fields(tenant_id = %tenant_id, period_id = %id))]
    pub async fn set_as_current(
        &self,
        tenant_id: TenantId,
        id: FiscalPeriodId,
    ) -> Result<FiscalPeriod, FiscalError> {
        let period = self
            .repo
            .set_current(tenant_id, id)
            .await?
            .ok_or(FiscalError::PeriodNotFound(id))?;
        info!("Current fiscal period changed");
        Ok(period)
    }

    /// Closes a period, freezing its counters.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` or `AlreadyClosed`.
    #[instrument(skip(self), fields(period_id = %id, actor = %closed_by))]
    pub async fn close(
        &self,
        id: FiscalPeriodId,
        closed_by: ActorId,
    ) -> Result<FiscalPeriod, FiscalError> {
        match self.repo.close(id, closed_by, Utc::now()).await? {
            Some(period) => {
                info!("Fiscal period closed");
                Ok(period)
            }
            None => {
                self.get(id).await?;
                Err(FiscalError::AlreadyClosed(id))
            }
        }
    }

    /// Reopens a closed period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` or `NotClosed`.
    #[instrument(skip(self), fields(period_id = %id))]
    pub async fn reopen(&self, id: FiscalPeriodId) -> Result<FiscalPeriod, FiscalError> {
        match self.repo.reopen(id).await? {
            Some(period) => {
                info!("Fiscal period reopened");
                Ok(period)
            }
            None => {
                self.get(id).await?;
                Err(FiscalError::NotClosed(id))
            }
        }
    }

    /// Deletes a period that is neither current nor closed and holds no
    /// journal entries.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound`, `CannotDeleteCurrent`, `CannotDeleteClosed`
    /// or `HasEntries`.
    #[instrument(skip(self), fields(period_id = %id))]
    pub async fn delete(&self, id: FiscalPeriodId) -> Result<(), FiscalError> {
        match self.repo.delete_if_deletable(id).await? {
            PeriodDeletion::Deleted => {
                info!("Fiscal period deleted");
                Ok(())
            }
            PeriodDeletion::NotFound => Err(FiscalError::PeriodNotFound(id)),
            PeriodDeletion::Current => Err(FiscalError::CannotDeleteCurrent(id)),
            PeriodDeletion::Closed => Err(FiscalError::CannotDeleteClosed(id)),
            PeriodDeletion::HasEntries => Err(FiscalError::HasEntries(id)),
        }
    }

    /// Issues the next invoice number, e.g. `INV-8283-0001`.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` or `PeriodClosed`.
    pub async fn generate_invoice_number(&self, id: FiscalPeriodId) -> Result<String, FiscalError> {
        self.generate_document_number(id, DocumentType::Invoice).await
    }

    /// Issues the next purchase number, e.g. `PUR-8283-0001`.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` or `PeriodClosed`.
    pub async fn generate_purchase_number(&self, id: FiscalPeriodId) -> Result<String, FiscalError> {
        self.generate_document_number(id, DocumentType::Purchase).await
    }

    /// Issues the next voucher number, e.g. `JV-8283-0001`.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` or `PeriodClosed`.
    pub async fn generate_voucher_number(&self, id: FiscalPeriodId) -> Result<String, FiscalError> {
        self.generate_document_number(id, DocumentType::Voucher).await
    }

    /// Issues the next number of `doc_type` in the period.
    ///
    /// The counter moves through one atomic increment that only applies while
    /// the period is open, so concurrent callers never receive the same number
    /// and a close racing with this call either wins or loses cleanly.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` or `PeriodClosed`, or a repository error once
    /// the configured retries for transient failures are exhausted.
    #[instrument(skip(self), fields(period_id = %id, doc_type = ?doc_type))]
    pub async fn generate_document_number(
        &self,
        id: FiscalPeriodId,
        doc_type: DocumentType,
    ) -> Result<String, FiscalError> {
        let period = self.ensure_open(id).await?;

        let mut attempt = 0;
        let counter = loop {
            match self.repo.increment_counter(id, doc_type).await {
                Ok(counter) => break counter,
                Err(err) if err.is_transient() && attempt < self.max_increment_retries => {
                    attempt += 1;
                    warn!(attempt, error = %err, "Retrying document counter increment");
                }
                Err(err) => return Err(err.into()),
            }
        };

        let Some(counter) = counter else {
            // closed or deleted after the open check
            self.get(id).await?;
            return Err(FiscalError::PeriodClosed(id));
        };

        let number = format_document_number(period.prefix(doc_type), counter);
        info!(number = %number, "Document number issued");
        Ok(number)
    }
}
