use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use lastfetch::{
    CancelHandle, Cancelled, Config, Derived, DispatchOutcome, FetchCoordinator, Payloader,
    Snapshot,
};

/// Walk a simulated paginated feed through a latest-wins coordinator.
#[derive(Debug, Parser)]
#[command(name = "lastfetch", version)]
struct Cli {
    /// Config file (defaults to the per-user config path).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of pages to load before the derivation aborts.
    #[arg(long, default_value_t = 3)]
    pages: u32,

    /// Page whose fetch fails.
    #[arg(long)]
    fail_page: Option<u32>,

    /// Simulated latency of each fetch.
    #[arg(long, default_value_t = 50)]
    latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
struct PageRequest {
    page: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Feed {
    pages_loaded: u32,
    items: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    lastfetch::logging::init(&config.logging)?;

    let latency = Duration::from_millis(cli.latency_ms);
    let fail_page = cli.fail_page;
    let coordinator = FetchCoordinator::<PageRequest, Feed>::builder(
        move |request: PageRequest, previous: Option<Feed>, handle: CancelHandle| {
            fetch_page(request, previous, handle, latency, fail_page)
        },
    )
    .config(config.coordinator)
    .build()?;

    // The first request is superseded immediately and never lands.
    coordinator.dispatch(PageRequest { page: 1 });
    coordinator.dispatch(PageRequest { page: 1 });
    let mut state = coordinator.settled().await;

    let last_page = cli.pages;
    while !state.has_error {
        let outcome = coordinator.dispatch_with_reset(
            Payloader::derive(move |snap: &Snapshot<PageRequest, Feed>| {
                match &snap.previous_payload {
                    Some(PageRequest { page }) if *page < last_page => {
                        Derived::Payload(PageRequest { page: page + 1 })
                    }
                    _ => Derived::Abort,
                }
            }),
            |data| data,
        );
        if outcome == DispatchOutcome::Aborted {
            break;
        }
        state = coordinator.settled().await;
    }

    let state = coordinator.state();
    let stats = coordinator.stats();
    let report = serde_json::json!({
        "label": coordinator.label(),
        "request_id": state.request_id(),
        "is_loading": state.is_loading,
        "has_error": state.has_error,
        "error": state.error_message(),
        "last_payload": state.fetch_data.payload,
        "data": state.data,
        "stats": {
            "dispatched": stats.dispatched,
            "aborted": stats.aborted,
            "succeeded": stats.succeeded,
            "failed": stats.failed,
            "cancelled": stats.cancelled,
            "stale_discarded": stats.stale_discarded,
        },
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to render report")?
    );

    coordinator.dispose();
    Ok(())
}

async fn fetch_page(
    request: PageRequest,
    previous: Option<Feed>,
    handle: CancelHandle,
    latency: Duration,
    fail_page: Option<u32>,
) -> anyhow::Result<Feed> {
    tokio::select! {
        _ = handle.cancelled() => return Err(Cancelled.into()),
        _ = tokio::time::sleep(latency) => {}
    }

    if fail_page == Some(request.page) {
        anyhow::bail!("upstream returned 503 for page {}", request.page);
    }

    let mut feed = previous.unwrap_or(Feed {
        pages_loaded: 0,
        items: Vec::new(),
    });
    feed.pages_loaded = request.page;
    feed.items
        .extend((1..=3).map(|n| format!("page {} item {}", request.page, n)));
    Ok(feed)
}
