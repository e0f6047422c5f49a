//! Latest-wins fetch coordinator.
//!
//! A [`FetchCoordinator`] owns one logical async operation. Each dispatch
//! installs a new request record, cancels the previous in-flight fetch and
//! starts a new one. Only the fetch belonging to the record that is current
//! when it completes may change state; everything else is dropped.
//!
//! State is exposed two ways: whole [`FetchState`] values published on a
//! `watch` channel for consumers, and a [`Snapshot`](crate::snapshot::Snapshot)
//! read synchronously by derivation callbacks.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::cancel::{CancelController, CancelHandle};
use crate::config::{Config, CoordinatorConfig};
use crate::dispatch::{Derived, DispatchOutcome, Payloader};
use crate::error::CoordinatorError;
use crate::executor;
use crate::fetcher::Fetcher;
use crate::mvi::Reducer;
use crate::snapshot::SnapshotCache;
use crate::stats::{CoordinatorStats, StatsSnapshot};
use crate::transition::{FetchIntent, FetchReducer, FetchState};

type ResetFn<'a, D> = Box<dyn FnOnce(Option<D>) -> Option<D> + 'a>;

/// Mutable coordinator state, always accessed under one lock.
pub(crate) struct Core<P, D> {
    pub(crate) state: FetchState<P, D>,
    pub(crate) snapshot: SnapshotCache<P, D>,
    pub(crate) cancel: CancelController,
    pub(crate) disposed: bool,
}

pub(crate) struct Shared<P, D> {
    pub(crate) label: String,
    pub(crate) report_failures: bool,
    pub(crate) core: Mutex<Core<P, D>>,
    pub(crate) publisher: watch::Sender<FetchState<P, D>>,
    pub(crate) fetcher: Box<dyn Fetcher<P, D>>,
    pub(crate) runtime: Handle,
    pub(crate) stats: CoordinatorStats,
    /// Cancelled once on dispose. Wakes anything waiting on the coordinator.
    pub(crate) lifetime: CancelHandle,
}

impl<P, D> Shared<P, D>
where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    /// Apply one transition: reduce, mirror into the snapshot, publish.
    pub(crate) fn commit(&self, core: &mut Core<P, D>, intent: FetchIntent<P, D>) {
        let current = std::mem::take(&mut core.state);
        let next = FetchReducer::reduce(current, intent);
        core.snapshot.write(next.is_loading, next.data.clone());
        self.publisher.send_replace(next.clone());
        core.state = next;
    }

    /// Derivation, reset and commit all happen under one hold of the core
    /// lock, so no completion can land between reading the snapshot and
    /// committing the dispatch.
    fn dispatch(
        self: &Arc<Self>,
        payloader: Payloader<P, D>,
        reset: Option<ResetFn<'_, D>>,
    ) -> DispatchOutcome {
        let mut core = self.core.lock();
        if core.disposed {
            tracing::warn!(label = %self.label, "Dispatch after dispose ignored");
            return DispatchOutcome::Disposed;
        }

        let snapshot = core.snapshot.read();
        let derived = payloader.resolve(&snapshot);
        let reset_data = reset.map(|reset| reset(snapshot.previous_data));

        let payload = match derived {
            Derived::Payload(payload) => payload,
            Derived::Abort => {
                if let Some(data) = reset_data {
                    self.commit(&mut core, FetchIntent::DataReset { data });
                }
                self.stats.record_aborted();
                tracing::debug!(label = %self.label, "Dispatch aborted by derivation");
                return DispatchOutcome::Aborted;
            }
        };

        let record = core.state.fetch_data.next(payload);
        let id = record.id;
        self.commit(
            &mut core,
            FetchIntent::Dispatched {
                record,
                data: reset_data.flatten(),
            },
        );
        self.stats.record_dispatched();
        tracing::debug!(label = %self.label, request_id = id, "Request dispatched");

        let pending = executor::prepare(self, &mut core);
        drop(core);
        if let Some(pending) = pending {
            executor::launch(self, pending);
        }

        DispatchOutcome::Started { id }
    }

    fn dispose(&self) {
        let mut core = self.core.lock();
        if core.disposed {
            return;
        }
        core.disposed = true;
        let cancelled = core.cancel.cancel_live();
        self.lifetime.cancel();
        tracing::debug!(
            label = %self.label,
            request_id = core.state.fetch_data.id,
            cancelled_in_flight = cancelled,
            "Coordinator disposed"
        );
    }
}

/// Builder for [`FetchCoordinator`].
pub struct CoordinatorBuilder<P, D> {
    fetcher: Box<dyn Fetcher<P, D>>,
    config: CoordinatorConfig,
    runtime: Option<Handle>,
}

impl<P, D> CoordinatorBuilder<P, D>
where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Take the `[coordinator]` section of a config file.
    pub fn config_file(self, path: &Path) -> Result<Self, CoordinatorError> {
        let config = Config::load_from(path)?;
        Ok(self.config(config.coordinator))
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    /// Runtime that fetch tasks are spawned on. Defaults to the ambient one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<FetchCoordinator<P, D>, CoordinatorError> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| CoordinatorError::NoRuntime)?,
        };

        let state = FetchState::initial(self.config.initial_loading);
        let snapshot = SnapshotCache::new(state.is_loading, state.data.clone());
        let (publisher, _) = watch::channel(state.clone());

        let shared = Shared {
            label: self.config.label,
            report_failures: self.config.report_failures,
            core: Mutex::new(Core {
                state,
                snapshot,
                cancel: CancelController::new(),
                disposed: false,
            }),
            publisher,
            fetcher: self.fetcher,
            runtime,
            stats: CoordinatorStats::default(),
            lifetime: CancelHandle::new(),
        };

        Ok(FetchCoordinator {
            shared: Arc::new(shared),
        })
    }
}

/// Owner of a latest-wins fetch. Dropping it disposes it.
pub struct FetchCoordinator<P, D>
where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    shared: Arc<Shared<P, D>>,
}

impl<P, D> FetchCoordinator<P, D>
where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    /// Coordinator with default settings on the ambient tokio runtime.
    pub fn new<F>(fetcher: F) -> Result<Self, CoordinatorError>
    where
        F: Fetcher<P, D>,
    {
        Self::builder(fetcher).build()
    }

    pub fn builder<F>(fetcher: F) -> CoordinatorBuilder<P, D>
    where
        F: Fetcher<P, D>,
    {
        CoordinatorBuilder {
            fetcher: Box::new(fetcher),
            config: CoordinatorConfig::default(),
            runtime: None,
        }
    }

    /// Start a new request. Never fails because of the fetch.
    ///
    /// A derivation closure runs synchronously while the coordinator holds
    /// its internal lock, so it sees exactly the state the dispatch commits
    /// against. It must not call back into this coordinator's `dispatch`,
    /// `has_in_flight`, `is_disposed` or `dispose`; those would deadlock.
    /// [`state`](Self::state) and [`stats`](Self::stats) are fine.
    pub fn dispatch(&self, payloader: impl Into<Payloader<P, D>>) -> DispatchOutcome {
        self.shared.dispatch(payloader.into(), None)
    }

    /// Like [`dispatch`](Self::dispatch), but replaces the data with
    /// `reset(previous_data)` instead of clearing it. The reset runs even when
    /// the derivation aborts. Like the derivation, it runs under the
    /// coordinator lock.
    pub fn dispatch_with_reset<R>(
        &self,
        payloader: impl Into<Payloader<P, D>>,
        reset: R,
    ) -> DispatchOutcome
    where
        R: FnOnce(Option<D>) -> Option<D>,
    {
        self.shared.dispatch(payloader.into(), Some(Box::new(reset)))
    }

    /// Cloneable dispatch-only handle.
    pub fn dispatcher(&self) -> Dispatcher<P, D> {
        Dispatcher {
            shared: Arc::clone(&self.shared),
        }
    }

    /// The last committed state. Reads the published copy, so it never
    /// waits on an in-progress dispatch or completion.
    pub fn state(&self) -> FetchState<P, D> {
        self.shared.publisher.borrow().clone()
    }

    /// Receiver that sees every committed state.
    ///
    /// `watch` semantics apply: a slow receiver skips intermediate states and
    /// only observes the latest one, never a partially applied transition.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<P, D>> {
        self.shared.publisher.subscribe()
    }

    /// Wait until `is_loading` is false and return that state.
    ///
    /// Before the first dispatch this waits for the first settled request
    /// unless the coordinator was configured with `initial_loading = false`.
    /// If the coordinator is disposed first, returns the state as it stands,
    /// which may still be loading.
    ///
    /// A current request whose fetch ends in [`Cancelled`](crate::Cancelled)
    /// leaves `is_loading` set, so this keeps waiting until the next
    /// dispatch settles or the coordinator is disposed.
    pub async fn settled(&self) -> FetchState<P, D> {
        let mut receiver = self.shared.publisher.subscribe();
        tokio::select! {
            result = receiver.wait_for(|state| !state.is_loading) => match result {
                Ok(state) => state.clone(),
                Err(_) => self.state(),
            },
            _ = self.shared.lifetime.cancelled() => self.state(),
        }
    }

    /// Point-in-time copy of the outcome counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Name used in this coordinator's log events.
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Whether a fetch handle is currently live.
    pub fn has_in_flight(&self) -> bool {
        self.shared.core.lock().cancel.has_live()
    }

    /// True once [`dispose`](Self::dispose) ran, directly or through `Drop`.
    pub fn is_disposed(&self) -> bool {
        self.shared.core.lock().disposed
    }

    /// Cancel any in-flight fetch and stop accepting dispatches. Later
    /// completions are discarded. Idempotent.
    pub fn dispose(&self) {
        self.shared.dispose();
    }
}

impl<P, D> Drop for FetchCoordinator<P, D>
where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

/// Dispatch half of a coordinator, cheap to clone and hand to other tasks.
///
/// Dispatching through it after the coordinator was disposed returns
/// [`DispatchOutcome::Disposed`]. Derivation and reset callbacks follow the
/// same rules as [`FetchCoordinator::dispatch`].
pub struct Dispatcher<P, D> {
    shared: Arc<Shared<P, D>>,
}

impl<P, D> Clone for Dispatcher<P, D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P, D> Dispatcher<P, D>
where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    pub fn dispatch(&self, payloader: impl Into<Payloader<P, D>>) -> DispatchOutcome {
        self.shared.dispatch(payloader.into(), None)
    }

    pub fn dispatch_with_reset<R>(
        &self,
        payloader: impl Into<Payloader<P, D>>,
        reset: R,
    ) -> DispatchOutcome
    where
        R: FnOnce(Option<D>) -> Option<D>,
    {
        self.shared.dispatch(payloader.into(), Some(Box::new(reset)))
    }
}
