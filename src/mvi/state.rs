//! Marker trait for reducer-owned state.

/// State values are replaced wholesale on every transition, never mutated
/// field by field in place, so they must be cheap to clone and sendable to
/// subscribers on other tasks.
pub trait State: Clone + Send + Sync + 'static {}
