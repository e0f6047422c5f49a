//! Marker trait for intents.

/// Something that happened and may change state: a dispatch, a data reset,
/// a fetch completing or failing.
pub trait Intent: Send + 'static {}
