//! Initial and incremental loading.
//!
//! [`initial_load`] fetches page 1 before anything is rendered. [`PageView`]
//! then owns a [`Feed`] on a dedicated tokio task: it listens for scroll
//! signals, issues one fetch at a time, and publishes a [`FeedSnapshot`] after
//! every change. Tearing the view down aborts any outstanding fetch, so no
//! response is applied once the view is gone.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::feed::{Feed, FeedOptions, FeedSnapshot, LoaderState};
use crate::launch::Launch;
use crate::scroll::ScrollMetrics;
use crate::source::{LaunchSource, Page, PageRequest};

/// Capacity of the scroll signal channel.
const SCROLL_CHANNEL_CAPACITY: usize = 64;

/// Fetch page 1 of the listing.
///
/// # Errors
///
/// Returns the source's error unchanged; there is no fallback for a failed
/// initial load.
pub async fn initial_load(source: &dyn LaunchSource, page_size: u32) -> Result<Vec<Launch>> {
    let request = PageRequest::first(page_size);
    debug!(%request, "Initial load");
    let page = source.fetch_page(request).await?;
    info!(items = page.len(), "Initial page loaded");
    Ok(page.items)
}

/// A mounted listing that grows as scroll signals arrive.
#[derive(Debug)]
pub struct PageView {
    scroll_tx: mpsc::Sender<ScrollMetrics>,
    snapshots: watch::Receiver<FeedSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Feed>>,
}

impl PageView {
    /// Mount a view over the initial launches.
    ///
    /// Mounting raises the fetch flag once, so the next page is requested
    /// immediately unless the feed is already exhausted. Must be called from
    /// within a tokio runtime.
    #[must_use]
    pub fn mount(source: Arc<dyn LaunchSource>, initial: Vec<Launch>, options: FeedOptions) -> Self {
        let mut feed = Feed::new(initial, options);
        let first = feed.mount();

        let (scroll_tx, scroll_rx) = mpsc::channel(SCROLL_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshots) = watch::channel(feed.snapshot());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_view(
            feed,
            first,
            source,
            scroll_rx,
            shutdown_rx,
            snapshot_tx,
        ));

        Self {
            scroll_tx,
            snapshots,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Report a scroll position to the view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ViewClosed`] if the view has been torn down.
    pub async fn scroll(&self, metrics: ScrollMetrics) -> Result<()> {
        self.scroll_tx
            .send(metrics)
            .await
            .map_err(|_| Error::ViewClosed)
    }

    /// Subscribe to feed snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.clone()
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop observing scroll signals, cancel any outstanding fetch and return
    /// the final state.
    ///
    /// # Errors
    ///
    /// Returns an error if the view task panicked.
    pub async fn teardown(mut self) -> Result<FeedSnapshot> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let task = self
            .task
            .take()
            .ok_or_else(|| Error::internal("page view task already joined"))?;
        let feed = task
            .await
            .map_err(|e| Error::internal(format!("page view task failed: {e}")))?;
        Ok(feed.snapshot())
    }
}

impl Drop for PageView {
    fn drop(&mut self) {
        // Signal shutdown so the view loop aborts its fetch
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// A fetch running on its own task.
struct InFlight {
    request: PageRequest,
    task: JoinHandle<Result<Page>>,
}

fn spawn_fetch(source: &Arc<dyn LaunchSource>, request: PageRequest) -> InFlight {
    let source = Arc::clone(source);
    let task = tokio::spawn(async move { source.fetch_page(request).await });
    InFlight { request, task }
}

/// Wait for the outstanding fetch, or forever if there is none.
async fn next_outcome(in_flight: &mut Option<InFlight>) -> (PageRequest, Result<Page>) {
    match in_flight {
        Some(fetch) => {
            let outcome = match (&mut fetch.task).await {
                Ok(outcome) => outcome,
                Err(e) => Err(Error::internal(format!("fetch task failed: {e}"))),
            };
            (fetch.request, outcome)
        }
        None => std::future::pending().await,
    }
}

async fn run_view(
    mut feed: Feed,
    first: Option<PageRequest>,
    source: Arc<dyn LaunchSource>,
    mut scroll_rx: mpsc::Receiver<ScrollMetrics>,
    mut shutdown_rx: oneshot::Receiver<()>,
    snapshots: watch::Sender<FeedSnapshot>,
) -> Feed {
    let mut in_flight = first.map(|request| spawn_fetch(&source, request));
    debug!(state = %feed.state(), "Page view mounted");

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => break,

            (request, outcome) = next_outcome(&mut in_flight) => {
                in_flight = None;
                feed.settle(request, outcome);
                snapshots.send_replace(feed.snapshot());
            }

            signal = scroll_rx.recv() => {
                let Some(metrics) = signal else { break };
                if let Some(request) = feed.on_scroll(metrics) {
                    in_flight = Some(spawn_fetch(&source, request));
                    snapshots.send_replace(feed.snapshot());
                }
            }
        }
    }

    if let Some(fetch) = in_flight.take() {
        debug!(page = fetch.request.page, "Cancelling in-flight fetch");
        fetch.task.abort();
    }
    debug!(launches = feed.launches().len(), "Page view torn down");
    feed
}

/// Load `pages` pages through a [`PageView`], scrolling to the bottom after
/// each settled fetch.
///
/// Stops early when the feed is exhausted. Failed incremental fetches count
/// towards `pages`.
///
/// # Errors
///
/// Returns an error if the initial load fails.
pub async fn load_pages(
    source: Arc<dyn LaunchSource>,
    options: FeedOptions,
    viewport_height: f64,
    pages: u32,
) -> Result<FeedSnapshot> {
    let initial = initial_load(source.as_ref(), options.page_size).await?;
    if pages <= 1 {
        return Ok(Feed::new(initial, options).snapshot());
    }

    let view = PageView::mount(source, initial, options);
    let mut snapshots = view.subscribe();
    let wanted = u64::from(pages - 1);

    loop {
        let settled = snapshots
            .wait_for(|s| s.state != LoaderState::Fetching)
            .await
            .map_err(|_| Error::ViewClosed)?
            .clone();
        if settled.settled >= wanted || settled.state == LoaderState::Exhausted {
            break;
        }

        view.scroll(ScrollMetrics::at_bottom(viewport_height)).await?;
        snapshots
            .wait_for(|s| s.state == LoaderState::Fetching || s.settled > settled.settled)
            .await
            .map_err(|_| Error::ViewClosed)?;
    }

    view.teardown().await
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::sync::Notify;

    use crate::feed::tests::page_of;
    use crate::feed::{CursorPolicy, EndOfFeed};
    use crate::logging::init_test_logging;

    /// A source that answers from a script and records every request.
    #[derive(Default)]
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Page>>>,
        requests: Mutex<Vec<PageRequest>>,
        outstanding: AtomicUsize,
        max_outstanding: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Page>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ..Self::default()
            }
        }

        fn gated(script: Vec<Result<Page>>, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(script)
            }
        }

        fn requests(&self) -> Vec<PageRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl LaunchSource for ScriptedSource {
        async fn fetch_page(&self, request: PageRequest) -> Result<Page> {
            self.requests.lock().unwrap().push(request);
            let now = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_outstanding.fetch_max(now, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            self.outstanding.fetch_sub(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Page::default()))
        }
    }

    fn never_ending() -> FeedOptions {
        FeedOptions {
            end_of_feed: EndOfFeed::Never,
            ..FeedOptions::default()
        }
    }

    fn near_bottom() -> ScrollMetrics {
        ScrollMetrics::at_bottom(900.0)
    }

    #[tokio::test]
    async fn test_initial_load_requests_page_one() {
        let source = ScriptedSource::new(vec![Ok(page_of(1, 6))]);
        let launches = initial_load(&source, 6).await.unwrap();

        assert_eq!(launches.len(), 6);
        assert_eq!(launches[0].id, "1-0");
        assert_eq!(source.requests(), vec![PageRequest::new(1, 6)]);
    }

    #[tokio::test]
    async fn test_initial_load_propagates_failure() {
        let source = ScriptedSource::new(vec![Err(Error::status(502, 1, "bad gateway"))]);
        let err = initial_load(&source, 6).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_mount_fetches_next_page() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(page_of(2, 6))]));
        let view = PageView::mount(source.clone(), page_of(1, 6).items, never_ending());

        let snapshot = view
            .subscribe()
            .wait_for(|s| s.launches.len() == 12)
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.cursor, 3);
        assert_eq!(snapshot.state, LoaderState::Idle);
        assert_eq!(source.requests(), vec![PageRequest::new(2, 6)]);

        view.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_scroll_burst_issues_single_request() {
        init_test_logging();
        let gate = Arc::new(Notify::new());
        let source = Arc::new(ScriptedSource::gated(
            vec![Ok(page_of(2, 6)), Ok(page_of(3, 6))],
            gate.clone(),
        ));
        let view = PageView::mount(source.clone(), page_of(1, 6).items, never_ending());

        // The mount fetch is held open by the gate
        for _ in 0..20 {
            view.scroll(near_bottom()).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(source.requests(), vec![PageRequest::new(2, 6)]);

        gate.notify_one();
        view.subscribe()
            .wait_for(|s| s.settled == 1)
            .await
            .unwrap();

        view.scroll(near_bottom()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        gate.notify_one();
        let snapshot = view
            .subscribe()
            .wait_for(|s| s.settled == 2)
            .await
            .unwrap()
            .clone();

        assert_eq!(snapshot.launches.len(), 18);
        assert_eq!(
            source.requests(),
            vec![PageRequest::new(2, 6), PageRequest::new(3, 6)]
        );
        assert_eq!(source.max_outstanding.load(Ordering::SeqCst), 1);

        view.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_fetch_returns_to_idle() {
        init_test_logging();
        let source = Arc::new(ScriptedSource::new(vec![Err(Error::status(500, 2, "boom"))]));
        let options = FeedOptions {
            cursor_policy: CursorPolicy::Advance,
            ..never_ending()
        };
        let view = PageView::mount(source, page_of(1, 6).items, options);

        let snapshot = view
            .subscribe()
            .wait_for(|s| s.settled == 1)
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.state, LoaderState::Idle);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.cursor, 3);
        assert_eq!(snapshot.launches.len(), 6);

        view.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_teardown_cancels_outstanding_fetch() {
        init_test_logging();
        let gate = Arc::new(Notify::new());
        let source = Arc::new(ScriptedSource::gated(vec![Ok(page_of(2, 6))], gate.clone()));
        let view = PageView::mount(source.clone(), page_of(1, 6).items, never_ending());

        tokio::time::sleep(Duration::from_millis(20)).await;
        let snapshot = view.teardown().await.unwrap();

        // The response never lands
        gate.notify_one();
        assert_eq!(snapshot.launches.len(), 6);
        assert_eq!(snapshot.settled, 0);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_scroll_after_teardown_fails() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(page_of(2, 6))]));
        let view = PageView::mount(source, page_of(1, 6).items, never_ending());
        let sender = view.scroll_tx.clone();
        view.teardown().await.unwrap();

        assert!(sender.send(near_bottom()).await.is_err());
    }

    #[tokio::test]
    async fn test_load_pages_collects_in_order() {
        init_test_logging();
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(page_of(1, 6)),
            Ok(page_of(2, 6)),
            Ok(page_of(3, 6)),
        ]));
        let snapshot = load_pages(source.clone(), never_ending(), 900.0, 3)
            .await
            .unwrap();

        let ids: Vec<_> = snapshot.launches.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), 18);
        assert_eq!(ids[0], "1-0");
        assert_eq!(ids[6], "2-0");
        assert_eq!(ids[17], "3-5");
        assert_eq!(snapshot.cursor, 4);
        assert_eq!(
            source.requests(),
            vec![
                PageRequest::new(1, 6),
                PageRequest::new(2, 6),
                PageRequest::new(3, 6)
            ]
        );
    }

    #[tokio::test]
    async fn test_load_pages_single_page_skips_mount() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(page_of(1, 6))]));
        let snapshot = load_pages(source.clone(), FeedOptions::default(), 900.0, 1)
            .await
            .unwrap();

        assert_eq!(snapshot.launches.len(), 6);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_load_pages_stops_when_exhausted() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(page_of(1, 6)),
            Ok(page_of(2, 1)),
        ]));
        let snapshot = load_pages(source.clone(), FeedOptions::default(), 900.0, 10)
            .await
            .unwrap();

        assert_eq!(snapshot.launches.len(), 7);
        assert_eq!(snapshot.state, LoaderState::Exhausted);
        assert_eq!(source.requests().len(), 2);
    }
}
