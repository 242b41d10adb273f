//! Translation of `SeaORM` errors into repository errors.

use lekha_core::repository::RepositoryError;
use sea_orm::{DbErr, SqlErr};

/// Classifies a database error for the services.
///
/// Unique-constraint violations become `UniqueViolation`. Failures to reach
/// the database become `Unavailable`, which services may retry. Anything
/// else is a `Backend` error.
pub(crate) fn repository_error(err: DbErr) -> RepositoryError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return RepositoryError::UniqueViolation(detail);
    }
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => RepositoryError::Unavailable(err.to_string()),
        other => RepositoryError::Backend(other.to_string()),
    }
}
