//! Shared test utilities: a fetcher whose calls the test resolves by hand.

#![allow(dead_code, unused_imports)]

pub mod scripted_fetcher;

use lastfetch::{FetchCoordinator, FetchState};
use std::time::Duration;

pub use scripted_fetcher::{scripted, Call, Calls, Items, Page};

pub const WAIT: Duration = Duration::from_secs(2);

/// Wait until the coordinator publishes a state matching `predicate`.
pub async fn wait_for_state<F>(
    coordinator: &FetchCoordinator<Page, Items>,
    predicate: F,
) -> FetchState<Page, Items>
where
    F: FnMut(&FetchState<Page, Items>) -> bool,
{
    let mut receiver = coordinator.subscribe();
    tokio::time::timeout(WAIT, receiver.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .map(|state| state.clone())
        .expect("coordinator channel closed")
}

/// Poll `condition` until it holds.
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    while start.elapsed() < WAIT {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within {:?}", WAIT);
}

pub fn items(names: &[&str]) -> Items {
    names.iter().map(|name| name.to_string()).collect()
}
