//! Completion-handler bridge for callers that want a callback instead of a
//! future.
//!
//! Every manager method returns a future. `deliver` runs one of those
//! futures on the current tokio runtime and hands the outcome to a handler,
//! so the choice between awaiting and a callback is made per call.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::error::ApiError;

/// Spawn `future` and call `handler` exactly once with its outcome.
///
/// Must be called from within a tokio runtime. The returned handle
/// completes after the handler has run.
pub fn deliver<F, T, H>(future: F, handler: H) -> JoinHandle<()>
where
    F: Future<Output = Result<T, ApiError>> + Send + 'static,
    T: Send + 'static,
    H: FnOnce(Result<T, ApiError>) + Send + 'static,
{
    tokio::spawn(async move {
        handler(future.await);
    })
}
