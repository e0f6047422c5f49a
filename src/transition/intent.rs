//! Intents accepted by the fetch reducer.

use std::sync::Arc;

use crate::mvi::Intent;
use crate::request::RequestRecord;

#[derive(Debug, Clone)]
pub enum FetchIntent<P, D> {
    /// A new request was dispatched.
    Dispatched {
        record: RequestRecord<P>,
        /// Data to show while loading (`None` unless a reset function kept some).
        data: Option<D>,
    },

    /// The derivation aborted but a reset function still replaced the data.
    DataReset { data: Option<D> },

    /// The fetch for request `id` resolved.
    Succeeded { id: u64, data: D },

    /// The fetch for request `id` failed with something other than a
    /// cancellation.
    Failed { id: u64, error: Arc<anyhow::Error> },
}

impl<P: Send + 'static, D: Send + 'static> Intent for FetchIntent<P, D> {}
