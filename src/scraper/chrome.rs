use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::app::{Result, ScrapeError};
use crate::scraper::config::ScraperConfig;
use crate::scraper::{BrowserLauncher, BrowserSession};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches Chrome with a persistent profile using chromiumoxide
pub struct ChromeLauncher {
    config: ScraperConfig,
}

impl ChromeLauncher {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn open(&self, session_dir: &Path, headless: bool) -> Result<Box<dyn BrowserSession>> {
        tokio::fs::create_dir_all(session_dir).await?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(session_dir)
            .window_size(self.config.window_width, self.config.window_height)
            .request_timeout(self.config.timeout())
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        if !headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScrapeError::Browser(format!("Failed to build browser config: {}", e)))?;

        info!(
            "Launching browser (headless: {}, profile: {})",
            headless,
            session_dir.display()
        );

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            ScrapeError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH? \
                 Is another run using the same session directory?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        // A persistent profile may restore a tab; reuse it when present
        let page = match browser.pages().await {
            Ok(pages) if !pages.is_empty() => pages.into_iter().next(),
            _ => None,
        };
        let page = match page {
            Some(page) => page,
            None => browser
                .new_page("about:blank")
                .await
                .map_err(|e| ScrapeError::Browser(format!("Failed to create page: {}", e)))?,
        };

        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| ScrapeError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        Ok(Box::new(ChromeSession {
            browser,
            page,
            handler,
        }))
    }
}

/// Live page of a Chrome session
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    async fn evaluate_json<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| ScrapeError::Browser(format!("Failed to parse result: {:?}", e)))
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn wait_for_load(&self) -> Result<()> {
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| ScrapeError::Browser(format!("Navigation failed: {}", e)))?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let start = Instant::now();

        loop {
            if self.page.find_element(selector).await.is_ok() {
                debug!("Selector '{}' matched after {:?}", selector, start.elapsed());
                return Ok(true);
            }

            if start.elapsed() >= timeout {
                return Ok(false);
            }

            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        let selector = serde_json::to_string(selector)?;
        self.evaluate_json(format!("document.querySelector({selector}) !== null"))
            .await
    }

    async fn query_all_outer_html(&self, selector: &str) -> Result<Vec<String>> {
        let selector = serde_json::to_string(selector)?;
        self.evaluate_json(format!(
            "Array.from(document.querySelectorAll({selector})).map(e => e.outerHTML)"
        ))
        .await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Element '{}' not found: {}", selector, e)))?
            .click()
            .await
            .map_err(|e| ScrapeError::Browser(format!("Click on '{}' failed: {}", selector, e)))?;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map_err(|e| ScrapeError::Browser(format!("Scroll failed: {}", e)))?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| ScrapeError::Browser(format!("Failed to read page content: {}", e)))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut session = self;

        let closed = session
            .browser
            .close()
            .await
            .map_err(|e| ScrapeError::Browser(format!("Failed to close browser: {}", e)));

        // Chrome must exit before the profile lock is released
        if closed.is_ok() {
            let _ = session.browser.wait().await;
        }
        session.handler.abort();

        closed.map(|_| ())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
