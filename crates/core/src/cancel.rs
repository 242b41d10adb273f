//! Cooperative cancellation of service calls.
//!
//! Service futures are safe to drop at any await point: nothing is left
//! half-written because every mutation is a single conditional write or a
//! single transaction. This helper ties that to a shared token.

use std::future::Future;

use lekha_shared::{AppError, ErrorKind};
use tokio_util::sync::CancellationToken;

/// The operation was abandoned because its token was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Operation cancelled")]
pub struct Cancelled;

impl From<Cancelled> for AppError {
    fn from(err: Cancelled) -> Self {
        Self::from_kind(ErrorKind::Infrastructure, err.to_string())
    }
}

/// Runs `fut` until it completes or `token` is cancelled, whichever is first.
///
/// On cancellation the future is dropped before it finishes.
///
/// # Errors
///
/// Returns `Cancelled` if the token fires first. A token that is already
/// cancelled never polls the future.
pub async fn run_cancellable<F>(token: &CancellationToken, fut: F) -> Result<F::Output, Cancelled>
where
    F: Future,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(Cancelled),
        output = fut => Ok(output),
    }
}
