//! Latest-wins asynchronous fetch coordination.
//!
//! A [`FetchCoordinator`] drives one logical request at a time. Each
//! [`dispatch`](FetchCoordinator::dispatch) supersedes whatever was in flight:
//! the previous fetch's [`CancelHandle`] is cancelled, and its result is
//! discarded when it arrives even if the fetch ignored the cancellation.
//!
//! ```ignore
//! let coordinator = FetchCoordinator::new(|page: u32, _previous: Option<Vec<Item>>, handle: CancelHandle| async move {
//!     handle.check()?;
//!     load_page(page).await
//! })?;
//!
//! coordinator.dispatch(1);
//! let state = coordinator.settled().await;
//!
//! // Next page, derived from the payload of the last successful fetch.
//! coordinator.dispatch_with_reset(
//!     Payloader::derive(|snap| snap.previous_payload.map(|page| page + 1).into()),
//!     |data| data,
//! );
//! ```

pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
mod executor;
pub mod fetcher;
pub mod logging;
pub mod mvi;
pub mod request;
pub mod snapshot;
pub mod stats;
pub mod transition;

pub use cancel::{is_cancellation, CancelController, CancelHandle, Cancelled};
pub use config::{Config, ConfigError, CoordinatorConfig, LoggingConfig};
pub use coordinator::{CoordinatorBuilder, Dispatcher, FetchCoordinator};
pub use dispatch::{Derived, DispatchOutcome, Payloader};
pub use error::CoordinatorError;
pub use fetcher::{FetchFuture, Fetcher};
pub use request::RequestRecord;
pub use snapshot::Snapshot;
pub use stats::StatsSnapshot;
pub use transition::{FetchState, RequestPhase};
