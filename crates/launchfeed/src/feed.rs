//! Pagination bookkeeping for the launch listing.
//!
//! [`Feed`] owns the Result List, the page cursor and the in-flight flag.
//! It performs no I/O: callers ask it for the next [`PageRequest`] when the
//! view mounts or scrolls, run the request themselves, and hand the outcome
//! back through [`Feed::settle`].
//!
//! At most one request is outstanding at a time. A scroll signal that arrives
//! while a request is in flight is ignored.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::launch::Launch;
use crate::scroll::ScrollMetrics;
use crate::source::{Page, PageRequest};

/// Page the incremental loader starts from; page 1 is the initial load.
pub const FIRST_INCREMENTAL_PAGE: u32 = 2;

/// When the feed stops asking for more pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfFeed {
    /// Stop once a page comes back with fewer launches than requested.
    #[default]
    ShortPage,
    /// Keep requesting pages for as long as scroll signals arrive.
    Never,
}

/// What happens to the page cursor when a fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorPolicy {
    /// Keep the cursor; the next qualifying scroll asks for the same page again.
    #[default]
    Hold,
    /// Move past the failed page. Its launches are never shown.
    Advance,
}

impl std::fmt::Display for EndOfFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShortPage => write!(f, "short_page"),
            Self::Never => write!(f, "never"),
        }
    }
}

impl std::fmt::Display for CursorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold => write!(f, "hold"),
            Self::Advance => write!(f, "advance"),
        }
    }
}

/// Loader state derived from the feed's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderState {
    /// No request outstanding; the next qualifying scroll triggers one.
    Idle,
    /// A request is outstanding.
    Fetching,
    /// The upstream ran out of launches. Terminal.
    Exhausted,
}

impl std::fmt::Display for LoaderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching => write!(f, "fetching"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Tunables for a [`Feed`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedOptions {
    /// Launches requested per page.
    pub page_size: u32,
    /// Distance from the viewport bottom that triggers the next page.
    pub margin: f64,
    /// Termination policy.
    pub end_of_feed: EndOfFeed,
    /// Cursor behaviour on failure.
    pub cursor_policy: CursorPolicy,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: crate::config::DEFAULT_PAGE_SIZE,
            margin: f64::from(crate::config::DEFAULT_SCROLL_MARGIN),
            end_of_feed: EndOfFeed::default(),
            cursor_policy: CursorPolicy::default(),
        }
    }
}

impl FeedOptions {
    /// Build options from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.api.page_size,
            margin: f64::from(config.scroll.margin),
            end_of_feed: config.feed.end_of_feed,
            cursor_policy: config.feed.cursor_policy,
        }
    }
}

/// What [`Feed::settle`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Launches were appended and the cursor advanced.
    Appended {
        /// Number of launches appended.
        count: usize,
    },
    /// Launches were appended and the feed is now exhausted.
    Exhausted {
        /// Number of launches appended.
        count: usize,
    },
    /// The fetch failed; nothing was appended.
    Failed,
    /// The outcome did not belong to the outstanding request and was dropped.
    Stale,
}

/// A point-in-time copy of the feed for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    /// Launches in arrival order.
    pub launches: Vec<Launch>,
    /// Next page to request.
    pub cursor: u32,
    /// Loader state.
    pub state: LoaderState,
    /// Number of incremental fetches that have settled.
    pub settled: u64,
    /// Number of fetches that failed.
    pub failures: u64,
}

/// Result List, page cursor and single-flight gate for one page view.
#[derive(Debug, Clone)]
pub struct Feed {
    launches: Vec<Launch>,
    cursor: u32,
    in_flight: Option<PageRequest>,
    exhausted: bool,
    settled: u64,
    failures: u64,
    options: FeedOptions,
}

impl Feed {
    /// Create a feed seeded with the initial page.
    ///
    /// The cursor starts at page 2. Under [`EndOfFeed::ShortPage`] a short
    /// initial page leaves the feed exhausted from the start.
    #[must_use]
    pub fn new(initial: Vec<Launch>, options: FeedOptions) -> Self {
        let exhausted = options.end_of_feed == EndOfFeed::ShortPage
            && initial.len() < options.page_size as usize;
        if exhausted {
            debug!(items = initial.len(), "Initial page is short, feed exhausted");
        }
        Self {
            launches: initial,
            cursor: FIRST_INCREMENTAL_PAGE,
            in_flight: None,
            exhausted,
            settled: 0,
            failures: 0,
            options,
        }
    }

    /// Raise the in-flight flag when the view mounts.
    ///
    /// Returns the request to issue, if any.
    pub fn mount(&mut self) -> Option<PageRequest> {
        self.raise("mount")
    }

    /// Handle a scroll signal.
    ///
    /// Returns the request to issue when the signal crosses the threshold and
    /// no request is outstanding.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<PageRequest> {
        if !metrics.is_near_bottom(self.options.margin) {
            return None;
        }
        self.raise("scroll")
    }

    fn raise(&mut self, trigger: &'static str) -> Option<PageRequest> {
        if self.exhausted {
            return None;
        }
        if let Some(outstanding) = self.in_flight {
            debug!(trigger, page = outstanding.page, "Fetch already in flight");
            return None;
        }
        let request = PageRequest::new(self.cursor, self.options.page_size);
        debug!(trigger, page = request.page, "Raising fetch flag");
        self.in_flight = Some(request);
        Some(request)
    }

    /// Apply the outcome of the outstanding request and clear the flag.
    pub fn settle(&mut self, request: PageRequest, outcome: Result<Page>) -> Settlement {
        if self.in_flight != Some(request) {
            warn!(
                page = request.page,
                "Dropping outcome for a request that is not in flight"
            );
            return Settlement::Stale;
        }
        self.in_flight = None;
        self.settled += 1;

        match outcome {
            Ok(page) => {
                let count = page.len();
                self.launches.extend(page.items);
                self.cursor += 1;
                info!(
                    page = request.page,
                    items = count,
                    total = self.launches.len(),
                    "Appended launch page"
                );

                if self.options.end_of_feed == EndOfFeed::ShortPage
                    && count < request.limit as usize
                {
                    self.exhausted = true;
                    info!(page = request.page, "Short page received, no more launches");
                    Settlement::Exhausted { count }
                } else {
                    Settlement::Appended { count }
                }
            }
            Err(e) => {
                self.failures += 1;
                if self.options.cursor_policy == CursorPolicy::Advance {
                    self.cursor += 1;
                }
                warn!(
                    page = request.page,
                    error = %e,
                    upstream = e.is_upstream(),
                    cursor = self.cursor,
                    "Launch page fetch failed"
                );
                Settlement::Failed
            }
        }
    }

    /// Current loader state.
    #[must_use]
    pub fn state(&self) -> LoaderState {
        if self.in_flight.is_some() {
            LoaderState::Fetching
        } else if self.exhausted {
            LoaderState::Exhausted
        } else {
            LoaderState::Idle
        }
    }

    /// Whether a request is outstanding.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The outstanding request, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<PageRequest> {
        self.in_flight
    }

    /// Launches in arrival order.
    #[must_use]
    pub fn launches(&self) -> &[Launch] {
        &self.launches
    }

    /// Next page to request.
    #[must_use]
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Number of incremental fetches that have settled.
    #[must_use]
    pub fn settled(&self) -> u64 {
        self.settled
    }

    /// Number of failed fetches so far.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Copy the current state for observers.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            launches: self.launches.clone(),
            cursor: self.cursor,
            state: self.state(),
            settled: self.settled,
            failures: self.failures,
        }
    }
}
