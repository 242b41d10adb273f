//! Fiscal period management.
//!
//! Periods carry dual-calendar boundaries, a per-tenant "current" flag, an
//! open/closed lifecycle and three document counters (invoice, purchase,
//! voucher) that only advance while the period is open.

pub mod error;
pub mod period;
pub mod repository;
pub mod service;


pub use error::FiscalError;
pub use period::{DocumentType, FiscalPeriod, document_prefix, format_document_number, year_code};
pub use repository::{FiscalPeriodRepository, PeriodDeletion};
pub use service::PeriodService;
