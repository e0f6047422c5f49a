//! Model-View-Intent primitives for coordinator state.
//!
//! Every change to observable state is expressed as an intent and applied by
//! a pure reducer, so a transition always produces one whole next state.
//!
//! ```text
//! dispatch / completion ──→ Intent ──→ Reducer ──→ State ──→ subscribers
//! ```

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::State;
