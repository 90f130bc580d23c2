//! Browser-driven scraping of item listings.
//!
//! # Architecture
//!
//! ```text
//! URL → BrowserSession → PageSnapshotter → StrategyResolver
//!                ↓
//!        ItemExtractor → ScrapedSet → ScrapeEvent stream
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use smartscrape::scraper::{ChromeLauncher, Orchestrator, RunRequest, ScraperConfig};
//!
//! let config = ScraperConfig::default();
//! let orchestrator = Orchestrator::new(Arc::new(ChromeLauncher::new(config.clone())), resolver, config)?;
//!
//! let mut events = orchestrator.run(RunRequest::new("https://books.toscrape.com/", 3, true));
//! while let Some(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! ```

mod chrome;
mod config;
mod extractor;
mod orchestrator;
mod snapshot;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use config::{
    ScraperConfig, DEFAULT_PRICE_PATTERN, DEFAULT_STRATEGY_SELECTOR, FALLBACK_ITEM_SELECTOR,
};
pub use extractor::ItemExtractor;
pub use orchestrator::{Orchestrator, RunOutcome, RunPhase, RunRequest};
pub use snapshot::PageSnapshotter;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;

/// Opens browser sessions backed by a persistent profile directory
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Open, or reuse, the profile at `session_dir` and return a live page
    async fn open(&self, session_dir: &Path, headless: bool) -> Result<Box<dyn BrowserSession>>;
}

/// A single live page inside a browser session
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load `url` in the page
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until the current document has loaded
    async fn wait_for_load(&self) -> Result<()>;

    /// Wait up to `timeout` for `selector` to match; `false` on timeout
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Whether `selector` currently matches at least one element
    async fn has_element(&self, selector: &str) -> Result<bool>;

    /// Outer markup of every element matching `selector`, in document order
    async fn query_all_outer_html(&self, selector: &str) -> Result<Vec<String>>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> Result<()>;

    /// Scroll to the full document height
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Full markup of the current document
    async fn content(&self) -> Result<String>;

    /// Release the page and the browser process
    async fn close(self: Box<Self>) -> Result<()>;
}
