//! Runs the fetch for the current request and applies its outcome.
//!
//! [`prepare`] runs under the core lock right after a dispatch is committed:
//! it retires the previous handle and issues a new one. [`launch`] spawns the
//! task that calls the fetcher. [`settle`] re-takes the lock when the fetch
//! finishes and applies the outcome only if the request is still current.
//! A fetch that panics settles as a failure.

use std::sync::Arc;

use tokio::task::JoinError;

use crate::cancel::{is_cancellation, CancelHandle, Cancelled};
use crate::coordinator::{Core, Shared};
use crate::transition::FetchIntent;

/// Everything needed to start one fetch, captured under the lock.
pub(crate) struct PendingFetch<P, D> {
    id: u64,
    payload: P,
    previous: Option<D>,
    handle: CancelHandle,
}

/// Arm a fetch for the current request record, if it has one to run.
pub(crate) fn prepare<P, D>(shared: &Shared<P, D>, core: &mut Core<P, D>) -> Option<PendingFetch<P, D>>
where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    let record = &core.state.fetch_data;
    if !record.is_runnable() {
        return None;
    }
    let id = record.id;
    let payload = record.payload.clone()?;

    if core.cancel.cancel_live() {
        tracing::debug!(
            label = %shared.label,
            request_id = id,
            "Cancelled superseded in-flight request"
        );
    }
    let handle = core.cancel.create();

    Some(PendingFetch {
        id,
        payload,
        previous: core.snapshot.previous_data(),
        handle,
    })
}

/// Spawn the fetch task on the coordinator's runtime.
pub(crate) fn launch<P, D>(shared: &Arc<Shared<P, D>>, pending: PendingFetch<P, D>)
where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    let task_shared = Arc::clone(shared);
    shared.runtime.spawn(async move {
        let PendingFetch {
            id,
            payload,
            previous,
            handle,
        } = pending;

        // Superseded before the task got to run: the request is no longer
        // live, so the fetcher is never called for it.
        if handle.is_cancelled() {
            task_shared.stats.record_cancelled();
            tracing::debug!(
                label = %task_shared.label,
                request_id = id,
                "Request cancelled before fetch started"
            );
            return;
        }

        tracing::debug!(label = %task_shared.label, request_id = id, "Fetch started");
        let fetch = task_shared
            .fetcher
            .fetch(payload.clone(), previous, handle.clone());
        // The fetch gets its own task so a panic in it surfaces as a
        // JoinError here and still settles the request.
        let outcome = match task_shared.runtime.spawn(fetch).await {
            Ok(outcome) => outcome,
            Err(err) => join_failure(err),
        };
        settle(&task_shared, id, payload, &handle, outcome);
    });
}

/// Map a failed fetch task onto the fetch's own error type.
fn join_failure<D>(err: JoinError) -> anyhow::Result<D> {
    if err.is_panic() {
        Err(anyhow::Error::new(err).context("fetch task panicked"))
    } else {
        Err(Cancelled.into())
    }
}

/// Apply a finished fetch to state, unless it is stale or a cancellation.
pub(crate) fn settle<P, D>(
    shared: &Shared<P, D>,
    id: u64,
    payload: P,
    handle: &CancelHandle,
    outcome: anyhow::Result<D>,
) where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    let mut core = shared.core.lock();
    core.cancel.release(handle);

    let current_id = core.state.fetch_data.id;
    let is_current = !core.disposed && current_id == id;

    match outcome {
        Err(err) if is_cancellation(&err) => {
            shared.stats.record_cancelled();
            tracing::debug!(label = %shared.label, request_id = id, "Fetch cancelled");
        }

        _ if !is_current => {
            shared.stats.record_stale();
            tracing::debug!(
                label = %shared.label,
                request_id = id,
                current_id,
                disposed = core.disposed,
                "Discarding stale completion"
            );
        }

        Ok(data) => {
            shared.commit(&mut core, FetchIntent::Succeeded { id, data });
            core.snapshot.commit_payload(Some(payload));
            shared.stats.record_succeeded();
            tracing::debug!(label = %shared.label, request_id = id, "Fetch succeeded");
        }

        Err(err) => {
            if shared.report_failures {
                tracing::error!(
                    label = %shared.label,
                    request_id = id,
                    error = %format!("{err:#}"),
                    "Fetch failed"
                );
            }
            shared.commit(
                &mut core,
                FetchIntent::Failed {
                    id,
                    error: Arc::new(err),
                },
            );
            shared.stats.record_failed();
        }
    }
}
