//! Fetcher that hands every call to the test and waits for a verdict.

use lastfetch::{CancelHandle, Cancelled, Fetcher};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub type Page = u32;
pub type Items = Vec<String>;

/// One invocation of the fetch function.
pub struct Call {
    pub payload: Page,
    pub previous: Option<Items>,
    pub handle: CancelHandle,
    respond_to: oneshot::Sender<anyhow::Result<Items>>,
}

impl Call {
    pub fn resolve(self, items: Items) {
        let _ = self.respond_to.send(Ok(items));
    }

    pub fn fail(self, message: &str) {
        let _ = self.respond_to.send(Err(anyhow::anyhow!(message.to_string())));
    }

    /// Fail the way a fetch that honored its cancel handle does.
    pub fn abort_cancelled(self) {
        let _ = self.respond_to.send(Err(Cancelled.into()));
    }
}

/// Receiving end of the scripted fetcher.
pub struct Calls {
    receiver: mpsc::UnboundedReceiver<Call>,
}

impl Calls {
    pub async fn next(&mut self) -> Call {
        tokio::time::timeout(Duration::from_secs(2), self.receiver.recv())
            .await
            .expect("timed out waiting for fetch call")
            .expect("fetcher dropped")
    }

    /// Let spawned tasks run, then assert the fetcher was not called.
    pub async fn assert_idle(&mut self) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(self.receiver.try_recv().is_err(), "unexpected fetch call");
    }
}

pub fn scripted() -> (impl Fetcher<Page, Items>, Calls) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let fetcher = move |payload: Page, previous: Option<Items>, handle: CancelHandle| {
        let sender = sender.clone();
        async move {
            let (respond_to, response) = oneshot::channel();
            let _ = sender.send(Call {
                payload,
                previous,
                handle,
                respond_to,
            });
            response
                .await
                .unwrap_or_else(|_| Err(anyhow::anyhow!("test dropped the call")))
        }
    };
    (fetcher, Calls { receiver })
}
