//! Per-request cancellation handles.
//!
//! Every dispatched request gets its own [`CancelHandle`]. The
//! [`CancelController`] keeps track of the one live handle and cancels it
//! whenever a newer request replaces it or the coordinator is torn down.
//!
//! Cancellation is advisory: the fetch function may watch the handle and bail
//! out early, but the coordinator never relies on that.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Notify;

/// Error returned by fetch functions that stopped because their handle was
/// cancelled.
///
/// The coordinator treats this error as expected and never records it as a
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request cancelled")]
pub struct Cancelled;

/// Returns true when `err` (or anything in its cause chain) is a [`Cancelled`].
pub fn is_cancellation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<Cancelled>())
}

/// Cancellation token tied to exactly one in-flight fetch.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Raise the cancel signal. Calling it again is a no-op.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called on this token or any
    /// clone of it.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the handle has been cancelled.
    ///
    /// Meant for `handle.check()?` between steps of a fetch.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Wait until the handle is cancelled.
    pub async fn cancelled(&self) {
        // Register with Notify before reading the flag so a cancel() racing
        // with this call cannot slip between the check and the await.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Two handles are the same token if they share the flag.
    pub fn same_token(&self, other: &CancelHandle) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// Hands out handles and guarantees at most one of them is live.
#[derive(Debug, Default)]
pub struct CancelController {
    live: Option<CancelHandle>,
}

impl CancelController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the outgoing handle, if any, then issue a fresh one.
    pub fn create(&mut self) -> CancelHandle {
        self.cancel_live();
        let handle = CancelHandle::new();
        self.live = Some(handle.clone());
        handle
    }

    /// Cancel `handle` and forget it if it is the live one.
    pub fn cancel(&mut self, handle: &CancelHandle) {
        handle.cancel();
        if self
            .live
            .as_ref()
            .is_some_and(|live| live.same_token(handle))
        {
            self.live = None;
        }
    }

    /// Cancel whatever handle is currently live. Returns true if one was.
    pub fn cancel_live(&mut self) -> bool {
        match self.live.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Retire the live handle without cancelling it (its request settled).
    pub fn release(&mut self, handle: &CancelHandle) {
        if self
            .live
            .as_ref()
            .is_some_and(|live| live.same_token(handle))
        {
            self.live = None;
        }
    }

    pub fn is_cancelled(handle: &CancelHandle) -> bool {
        handle.is_cancelled()
    }

    pub fn has_live(&self) -> bool {
        self.live.is_some()
    }
}
