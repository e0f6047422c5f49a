//! Errors surfaced by the coordinator API itself.
//!
//! Fetch failures are not in here: they are absorbed into
//! [`FetchState`](crate::transition::FetchState) and never returned to the
//! caller of `dispatch`.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Built outside a tokio runtime without an explicit handle.
    #[error("No tokio runtime available: build inside a runtime or pass a handle")]
    NoRuntime,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
