//! Shared utility functions.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Run `fut` until it finishes or `cancel` fires. `None` means cancelled.
pub async fn cancellable<F>(cancel: CancellationToken, fut: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}
