//! Suspension points
//!
//! Signature primitives run on tokio's blocking pool; key-set fetches run on
//! the caller's task. Both race an optional caller-supplied
//! [`CancellationToken`]. No timeouts are imposed here.

use crate::error::{JwtError, JwtResult};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run a CPU-bound closure on the blocking pool
pub(crate) async fn run_blocking<T, F>(
    cancellation: Option<&CancellationToken>,
    work: F,
) -> JwtResult<T>
where
    F: FnOnce() -> JwtResult<T> + Send + 'static,
    T: Send + 'static,
{
    cancellable(cancellation, async move {
        tokio::task::spawn_blocking(work).await.map_err(|e| {
            tracing::error!(error = %e, "signature task failed to complete");
            JwtError::TaskFailed
        })?
    })
    .await
}

/// Drive `fut` to completion unless `cancellation` fires first
pub(crate) async fn cancellable<T>(
    cancellation: Option<&CancellationToken>,
    fut: impl Future<Output = JwtResult<T>>,
) -> JwtResult<T> {
    let Some(token) = cancellation else {
        return fut.await;
    };
    if token.is_cancelled() {
        return Err(JwtError::Cancelled);
    }
    tokio::select! {
        biased;
        () = token.cancelled() => Err(JwtError::Cancelled),
        result = fut => result,
    }
}
