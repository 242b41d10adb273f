//! Core business logic for Lekha.
//!
//! Domain types, validation rules and services live here, written against
//! repository traits so they carry no web or database dependencies.
//!
//! # Modules
//!
//! - `calendar` - Bikram Sambat conversion and fiscal year bounds
//! - `fiscal` - Fiscal periods and gated document numbering
//! - `ledger` - Accounts, journal entries and ledger projections
//! - `memory` - In-process repository backend
//! - `cancel` - Cooperative cancellation of service calls

pub mod calendar;
pub mod cancel;
pub mod fiscal;
pub mod ledger;
pub mod memory;
pub mod repository;

pub use memory::InMemoryStore;
pub use repository::RepositoryError;
