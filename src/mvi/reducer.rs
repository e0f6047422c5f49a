//! Reducer trait.

use super::intent::Intent;
use super::state::State;

/// The only place state transitions happen.
///
/// `(State, Intent) -> State`, with no side effects. Anything that has to
/// happen around a transition (logging, cancelling, publishing) is the
/// caller's job.
pub trait Reducer {
    /// The whole value a transition replaces.
    type State: State;
    /// Events this reducer understands.
    type Intent: Intent;

    /// Produce the next state. Intents that do not apply return `state`
    /// unchanged.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
