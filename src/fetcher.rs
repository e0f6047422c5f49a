//! The caller-supplied fetch function.

use std::future::Future;
use std::pin::Pin;

use crate::cancel::CancelHandle;

/// Boxed future returned by a [`Fetcher`].
pub type FetchFuture<D> = Pin<Box<dyn Future<Output = anyhow::Result<D>> + Send + 'static>>;

/// Performs one fetch.
///
/// Called at most once per request record, with the payload, the data the
/// coordinator was showing when the request started, and the request's
/// cancel handle. A fetch that gives up because the handle was cancelled
/// should fail with [`Cancelled`](crate::cancel::Cancelled) so the failure is
/// not reported as an error.
///
/// Any `Fn(P, Option<D>, CancelHandle) -> impl Future<Output = anyhow::Result<D>>`
/// closure is a `Fetcher`.
pub trait Fetcher<P, D>: Send + Sync + 'static {
    fn fetch(&self, payload: P, previous: Option<D>, handle: CancelHandle) -> FetchFuture<D>;
}

impl<P, D, F, Fut> Fetcher<P, D> for F
where
    F: Fn(P, Option<D>, CancelHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<D>> + Send + 'static,
{
    fn fetch(&self, payload: P, previous: Option<D>, handle: CancelHandle) -> FetchFuture<D> {
        Box::pin(self(payload, previous, handle))
    }
}
