//! The scrape control loop.
//!
//! A run moves through [`RunPhase`]s:
//!
//! ```text
//! Starting → Navigated → StrategyResolved → Extracting ⇄ Navigating → Completed
//!                                  (any phase) → Errored
//! ```
//!
//! Progress is reported only through the [`ScrapeEvent`] stream; the loop
//! never returns an error to its caller.
//!
//! Two runs must not share a browser profile directory at the same time.
//! Chrome locks the profile, so callers have to serialize such runs.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::{Result, ScrapeError};
use crate::domain::{Navigation, ScrapeEvent, ScrapeStats, ScrapedSet, Strategy};
use crate::provider::StrategyResolver;
use crate::scraper::{
    BrowserLauncher, BrowserSession, ItemExtractor, PageSnapshotter, ScraperConfig,
};

const EVENT_BUFFER: usize = 64;

/// Parameters of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub url: String,
    pub max_pages: u32,
    pub headless: bool,
}

impl RunRequest {
    /// A page budget of zero is raised to one
    pub fn new(url: impl Into<String>, max_pages: u32, headless: bool) -> Self {
        Self {
            url: url.into(),
            max_pages: max_pages.max(1),
            headless,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Starting,
    Navigated,
    StrategyResolved,
    Extracting,
    Navigating,
    Completed,
    Errored,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(ScrapeStats),
    Errored(String),
}

enum PageTurn {
    Advanced,
    Exhausted,
    Failed(String),
}

/// Drives a browser session through one scrape run
pub struct Orchestrator {
    launcher: Arc<dyn BrowserLauncher>,
    resolver: Arc<StrategyResolver>,
    snapshotter: PageSnapshotter,
    extractor: ItemExtractor,
    config: ScraperConfig,
}

impl Orchestrator {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        resolver: Arc<StrategyResolver>,
        config: ScraperConfig,
    ) -> Result<Self> {
        if !(config.scroll_step_weight > 0.0) {
            return Err(ScrapeError::Config(format!(
                "scroll_step_weight must be positive, got {}",
                config.scroll_step_weight
            )));
        }
        if config.fallback_selector.trim().is_empty() {
            return Err(ScrapeError::Config(
                "fallback_selector must not be empty".to_string(),
            ));
        }

        Ok(Self {
            launcher,
            resolver,
            snapshotter: PageSnapshotter::new(&config)?,
            extractor: ItemExtractor::new(&config)?,
            config,
        })
    }

    /// Start a run in the background and return its event stream
    pub fn run(self: &Arc<Self>, request: RunRequest) -> mpsc::Receiver<ScrapeEvent> {
        self.run_with_cancel(request, CancellationToken::new())
    }

    /// Like [`run`](Self::run), stopping early once `cancel` fires
    pub fn run_with_cancel(
        self: &Arc<Self>,
        request: RunRequest,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<ScrapeEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let orchestrator = Arc::clone(self);

        tokio::spawn(async move {
            orchestrator.execute(request, tx, cancel).await;
        });

        rx
    }

    /// Run to completion, sending events to `tx`.
    ///
    /// The browser session is released on every exit path.
    pub async fn execute(
        &self,
        request: RunRequest,
        tx: mpsc::Sender<ScrapeEvent>,
        cancel: CancellationToken,
    ) -> RunOutcome {
        let events = EventSink { tx };
        let request = RunRequest::new(request.url, request.max_pages, request.headless);
        let mut phase = RunPhase::Starting;

        info!(
            "Starting run for {} (max pages: {}, headless: {})",
            request.url, request.max_pages, request.headless
        );

        let opened = guard(
            &cancel,
            self.launcher.open(&self.config.session_dir, request.headless),
        )
        .await;
        let session = match opened {
            Ok(session) => session,
            Err(e) => return fail(&events, phase, e).await,
        };

        let result = self
            .drive(session.as_ref(), &request, &events, &cancel, &mut phase)
            .await;

        let outcome = match result {
            Ok(scraped) => {
                phase = RunPhase::Completed;
                let stats = scraped.stats();
                info!(
                    "Run completed: {} items ({} with prices)",
                    stats.items, stats.prices_found
                );
                events.send(ScrapeEvent::Complete(scraped.into_items())).await;
                RunOutcome::Completed(stats)
            }
            Err(e) => fail(&events, phase, e).await,
        };

        if let Err(e) = session.close().await {
            warn!("Failed to release browser session: {}", e);
        }
        debug!("Run finished in phase {:?}", phase);

        outcome
    }

    async fn drive(
        &self,
        session: &dyn BrowserSession,
        request: &RunRequest,
        events: &EventSink,
        cancel: &CancellationToken,
        phase: &mut RunPhase,
    ) -> Result<ScrapedSet> {
        events
            .status(format!("Navigating to {}...", request.url))
            .await;
        guard(cancel, session.navigate(&request.url)).await?;
        guard(cancel, session.wait_for_load()).await?;
        pause(cancel, self.config.settle_delay()).await?;
        *phase = RunPhase::Navigated;

        events.status("Analyzing page structure...").await;
        let markup = guard(cancel, self.snapshotter.snapshot(session)).await?;
        let strategy = guard(cancel, async { Ok(self.resolver.resolve(&markup).await) }).await?;
        *phase = RunPhase::StrategyResolved;

        events
            .status(format!(
                "Strategy: {} | Target: {}",
                strategy.page_type().to_string().to_uppercase(),
                strategy.item_container_selector()
            ))
            .await;

        let max_pages = f64::from(request.max_pages);
        let step = match strategy.navigation() {
            Navigation::InfiniteScroll => self.config.scroll_step_weight,
            _ => 1.0,
        };
        let mut page_counter = step;
        let mut scraped = ScrapedSet::new();

        while page_counter <= max_pages {
            if cancel.is_cancelled() {
                return Err(ScrapeError::Cancelled);
            }
            *phase = RunPhase::Extracting;

            let selector = self.container_selector(session, &strategy, cancel).await?;
            let fragments = guard(cancel, session.query_all_outer_html(selector)).await?;
            let found = self.extractor.extract(&fragments);
            let found_count = found.len();
            let appended = scraped.extend_unique(found);

            debug!(
                "Page {}: {} candidates, {} items, {} new",
                page_counter,
                fragments.len(),
                found_count,
                appended.len()
            );

            if !appended.is_empty() {
                events.send(ScrapeEvent::Data(appended)).await;
            }
            events
                .send(ScrapeEvent::Progress((page_counter / max_pages).min(1.0)))
                .await;

            *phase = RunPhase::Navigating;
            match strategy.navigation() {
                Navigation::InfiniteScroll => {
                    events.status("Scrolling down...").await;
                    guard(cancel, session.scroll_to_bottom()).await?;
                    pause(cancel, self.config.settle_delay()).await?;
                    // Counted whether or not new content loaded
                    page_counter += step;
                }
                Navigation::Pagination {
                    next_button_selector,
                } => match self
                    .turn_page(session, next_button_selector, events, cancel)
                    .await?
                {
                    PageTurn::Advanced => page_counter += 1.0,
                    PageTurn::Exhausted => {
                        events.status("No more pages found.").await;
                        break;
                    }
                    PageTurn::Failed(reason) => {
                        warn!("Pagination stopped: {}", reason);
                        events
                            .status(format!("Could not open the next page, stopping: {}", reason))
                            .await;
                        break;
                    }
                },
                Navigation::SinglePage => break,
            }
        }

        Ok(scraped)
    }

    /// The strategy's container selector, or the fallback when it does not appear in time
    async fn container_selector<'a>(
        &'a self,
        session: &dyn BrowserSession,
        strategy: &'a Strategy,
        cancel: &CancellationToken,
    ) -> Result<&'a str> {
        let selector = strategy.item_container_selector();
        let waited = guard(
            cancel,
            session.wait_for_selector(selector, self.config.selector_timeout()),
        )
        .await;

        match waited {
            Ok(true) => Ok(selector),
            Ok(false) => {
                warn!(
                    "Selector '{}' not found, trying fallback '{}'",
                    selector, self.config.fallback_selector
                );
                Ok(&self.config.fallback_selector)
            }
            Err(ScrapeError::Cancelled) => Err(ScrapeError::Cancelled),
            Err(e) => {
                warn!("Waiting for '{}' failed ({}), trying fallback", selector, e);
                Ok(&self.config.fallback_selector)
            }
        }
    }

    /// Click the next-page control if present.
    ///
    /// Browser errors end pagination instead of failing the run.
    async fn turn_page(
        &self,
        session: &dyn BrowserSession,
        next_button_selector: &str,
        events: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<PageTurn> {
        let present = match guard(cancel, session.has_element(next_button_selector)).await {
            Ok(present) => present,
            Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
            Err(e) => return Ok(PageTurn::Failed(e.to_string())),
        };
        if !present {
            return Ok(PageTurn::Exhausted);
        }

        events.status("Clicking Next Page...").await;
        let clicked = guard(cancel, async {
            session.click(next_button_selector).await?;
            session.wait_for_load().await
        })
        .await;

        match clicked {
            Ok(()) => {}
            Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
            Err(e) => return Ok(PageTurn::Failed(e.to_string())),
        }

        pause(cancel, self.config.settle_delay()).await?;
        Ok(PageTurn::Advanced)
    }
}

struct EventSink {
    tx: mpsc::Sender<ScrapeEvent>,
}

impl EventSink {
    async fn send(&self, event: ScrapeEvent) {
        if self.tx.send(event).await.is_err() {
            debug!("Event receiver dropped");
        }
    }

    async fn status(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.send(ScrapeEvent::Status(message)).await;
    }
}

async fn fail(events: &EventSink, phase: RunPhase, error: ScrapeError) -> RunOutcome {
    warn!("Run failed during {:?}: {}", phase, error);
    events.status(format!("Error: {}", error)).await;
    RunOutcome::Errored(error.to_string())
}

/// Race `future` against cancellation
async fn guard<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ScrapeError::Cancelled),
        result = future => result,
    }
}

async fn pause(cancel: &CancellationToken, delay: Duration) -> Result<()> {
    guard(cancel, async {
        tokio::time::sleep(delay).await;
        Ok(())
    })
    .await
}
