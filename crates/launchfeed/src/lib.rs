//! `launchfeed` - An infinite-scroll listing of spaceflight launches
//!
//! This library loads launch records page by page from the public launch
//! query endpoint, tracks pagination for a single page view, and renders the
//! resulting listing.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod launch;
pub mod loader;
pub mod logging;
pub mod render;
pub mod scroll;
pub mod source;

pub use config::Config;
pub use error::{Error, Result};
pub use feed::{CursorPolicy, EndOfFeed, Feed, FeedOptions, FeedSnapshot, LoaderState};
pub use launch::Launch;
pub use loader::{initial_load, load_pages, PageView};
pub use logging::init_logging;
pub use source::{HttpLaunchSource, LaunchSource, Page, PageRequest};
