//! Utility functions

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::errors::HoistError;

/// Race a future against the cancellation token
pub async fn or_cancel<F>(cancel: &CancellationToken, fut: F) -> Result<F::Output, HoistError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HoistError::Cancelled),
        out = fut => Ok(out),
    }
}
