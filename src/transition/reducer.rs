//! Transition rules for fetch state.

use std::marker::PhantomData;

use crate::mvi::Reducer;

use super::intent::FetchIntent;
use super::state::FetchState;

/// Reducer for [`FetchState`].
///
/// Completions carry the id of the request they belong to. If that is not the
/// current request the state comes back unchanged.
pub struct FetchReducer<P, D>(PhantomData<fn() -> (P, D)>);

impl<P, D> FetchReducer<P, D> {
    /// Whether `intent` would be dropped as stale against `state`.
    pub fn is_stale(state: &FetchState<P, D>, intent: &FetchIntent<P, D>) -> bool {
        match intent {
            FetchIntent::Succeeded { id, .. } | FetchIntent::Failed { id, .. } => {
                !state.fetch_data.is_current(*id)
            }
            FetchIntent::Dispatched { .. } | FetchIntent::DataReset { .. } => false,
        }
    }
}

impl<P, D> Reducer for FetchReducer<P, D>
where
    P: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    type State = FetchState<P, D>;
    type Intent = FetchIntent<P, D>;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        if Self::is_stale(&state, &intent) {
            return state;
        }

        match intent {
            FetchIntent::Dispatched { record, data } => FetchState {
                data,
                error: None,
                is_loading: true,
                has_error: false,
                fetch_data: record,
            },

            FetchIntent::DataReset { data } => FetchState { data, ..state },

            FetchIntent::Succeeded { data, .. } => FetchState {
                data: Some(data),
                is_loading: false,
                ..state
            },

            FetchIntent::Failed { error, .. } => FetchState {
                error: Some(error),
                is_loading: false,
                has_error: true,
                ..state
            },
        }
    }
}
