//! In-memory browser and provider doubles for tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{Result, ScrapeError};
use crate::domain::Strategy;
use crate::provider::{ProviderError, StrategyProvider};
use crate::scraper::{BrowserLauncher, BrowserSession};

#[derive(Default)]
pub struct FakeProvider {
    strategy: Option<Strategy>,
    summary: Option<String>,
    delay: Option<Duration>,
    last_markup_len: Mutex<Option<usize>>,
    last_summary_input: Mutex<Option<String>>,
}

impl FakeProvider {
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy: Some(strategy),
            ..Default::default()
        }
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn last_markup_len(&self) -> Option<usize> {
        *self.last_markup_len.lock().unwrap()
    }

    pub fn last_summary_input(&self) -> Option<String> {
        self.last_summary_input.lock().unwrap().clone()
    }
}

#[async_trait]
impl StrategyProvider for FakeProvider {
    async fn analyze_structure(&self, markup: &str) -> std::result::Result<Strategy, ProviderError> {
        *self.last_markup_len.lock().unwrap() = Some(markup.chars().count());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.strategy
            .clone()
            .ok_or_else(|| ProviderError::Network("connection refused".into()))
    }

    async fn summarize(&self, data_json: &str) -> std::result::Result<String, ProviderError> {
        *self.last_summary_input.lock().unwrap() = Some(data_json.to_string());
        self.summary
            .clone()
            .ok_or_else(|| ProviderError::ApiError {
                status: 500,
                message: "internal error".into(),
            })
    }
}

/// One state of the fake page: markup plus what each selector matches
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    markup: String,
    elements: HashMap<String, Vec<String>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            markup: "<html><body><main>listing</main></body></html>".to_string(),
            elements: HashMap::new(),
        }
    }

    pub fn with_elements(mut self, selector: &str, elements: Vec<String>) -> Self {
        self.elements.insert(selector.to_string(), elements);
        self
    }

    fn matches(&self, selector: &str) -> bool {
        self.elements.get(selector).is_some_and(|e| !e.is_empty())
    }
}

/// What the orchestrator did to the fake browser
#[derive(Debug, Default)]
pub struct BrowserLog {
    pub opened: Option<(PathBuf, bool)>,
    pub navigations: Vec<String>,
    pub queries: Vec<String>,
    pub clicks: usize,
    pub scrolls: usize,
    pub closed: bool,
}

/// Launcher serving a scripted sequence of pages.
///
/// Clicking and scrolling move to the next page in the sequence.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    pages: Vec<FakePage>,
    fail_open: bool,
    fail_navigation: bool,
    fail_click: bool,
    log: Arc<Mutex<BrowserLog>>,
}

impl FakeLauncher {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    pub fn failing_click(mut self) -> Self {
        self.fail_click = true;
        self
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, BrowserLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn open(&self, session_dir: &Path, headless: bool) -> Result<Box<dyn BrowserSession>> {
        if self.fail_open {
            return Err(ScrapeError::Browser("profile is locked".into()));
        }
        self.log.lock().unwrap().opened = Some((session_dir.to_path_buf(), headless));
        Ok(Box::new(FakeSession {
            launcher: self.clone(),
            current: Mutex::new(0),
        }))
    }
}

struct FakeSession {
    launcher: FakeLauncher,
    current: Mutex<usize>,
}

impl FakeSession {
    fn page(&self) -> FakePage {
        let current = *self.current.lock().unwrap();
        self.launcher
            .pages
            .get(current)
            .cloned()
            .unwrap_or_default()
    }

    fn advance(&self) {
        let mut current = self.current.lock().unwrap();
        if *current + 1 < self.launcher.pages.len() {
            *current += 1;
        }
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        if self.launcher.fail_navigation {
            return Err(ScrapeError::Browser(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)));
        }
        self.launcher.log().navigations.push(url.to_string());
        Ok(())
    }

    async fn wait_for_load(&self) -> Result<()> {
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(self.page().matches(selector))
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        Ok(self.page().matches(selector))
    }

    async fn query_all_outer_html(&self, selector: &str) -> Result<Vec<String>> {
        self.launcher.log().queries.push(selector.to_string());
        Ok(self
            .page()
            .elements
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        if self.launcher.fail_click {
            return Err(ScrapeError::Browser(format!("{} is not clickable", selector)));
        }
        self.launcher.log().clicks += 1;
        self.advance();
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.launcher.log().scrolls += 1;
        self.advance();
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page().markup)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.launcher.log().closed = true;
        Ok(())
    }
}

/// `count` product cards with distinct links
pub fn product_cards(prefix: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                r#"<div class="card"><h3>{prefix} {i}</h3><a href="/{prefix}/{i}">view</a><span>${i}.99</span></div>"#
            )
        })
        .collect()
}
