//! Observable fetch state and its transitions.
//!
//! - `state.rs` - what consumers see
//! - `intent.rs` - dispatches and completions
//! - `reducer.rs` - the transition rules, including the stale-completion gate

mod intent;
mod reducer;
mod state;

pub use intent::FetchIntent;
pub use reducer::FetchReducer;
pub use state::{FetchState, RequestPhase};
