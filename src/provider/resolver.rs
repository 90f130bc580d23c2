use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::app::{Result, ScrapeError};
use crate::domain::{ScrapedItem, Strategy};
use crate::provider::{ProviderConfig, ProviderError, StrategyProvider};
use crate::scraper::ScraperConfig;

/// Obtains strategies and summaries without ever failing a run.
///
/// Provider errors and timeouts are logged and replaced by the default
/// strategy or an "unavailable" message.
pub struct StrategyResolver {
    provider: Arc<dyn StrategyProvider>,
    default_strategy: Strategy,
    timeout: Duration,
    max_input_chars: usize,
    max_summary_chars: usize,
    summary_sample_size: usize,
}

impl StrategyResolver {
    pub fn new(provider: Arc<dyn StrategyProvider>, default_strategy: Strategy) -> Self {
        let defaults = ProviderConfig::default();
        Self {
            provider,
            default_strategy,
            timeout: defaults.timeout(),
            max_input_chars: defaults.max_input_chars,
            max_summary_chars: defaults.max_summary_chars,
            summary_sample_size: defaults.summary_sample_size,
        }
    }

    /// Build a resolver whose default strategy is a single page of
    /// `scraper.default_strategy_selector` items
    pub fn from_config(
        provider: Arc<dyn StrategyProvider>,
        scraper: &ScraperConfig,
        config: &ProviderConfig,
    ) -> Result<Self> {
        let default_strategy = Strategy::single_page(&scraper.default_strategy_selector)
            .ok_or_else(|| {
                ScrapeError::Config("default_strategy_selector must not be empty".to_string())
            })?;

        Ok(Self {
            provider,
            default_strategy,
            timeout: config.timeout(),
            max_input_chars: config.max_input_chars,
            max_summary_chars: config.max_summary_chars,
            summary_sample_size: config.summary_sample_size,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub fn default_strategy(&self) -> &Strategy {
        &self.default_strategy
    }

    /// Infer a strategy from cleaned markup, falling back to the default
    pub async fn resolve(&self, markup: &str) -> Strategy {
        let input = truncate_chars(markup, self.max_input_chars);

        let result = tokio::time::timeout(self.timeout, self.provider.analyze_structure(input))
            .await
            .unwrap_or(Err(ProviderError::Timeout(self.timeout)));

        match result {
            Ok(strategy) => {
                info!(
                    "Resolved strategy {} with container '{}'",
                    strategy.page_type(),
                    strategy.item_container_selector()
                );
                strategy
            }
            Err(e) => {
                warn!("Strategy analysis failed, using default strategy: {}", e);
                self.default_strategy.clone()
            }
        }
    }

    /// Summarize a sample of the scraped items; never fails
    pub async fn summarize(&self, items: &[ScrapedItem]) -> String {
        let sample = &items[..items.len().min(self.summary_sample_size)];

        let data = match serde_json::to_string(sample) {
            Ok(data) => data,
            Err(e) => return unavailable(e),
        };
        let data = truncate_chars(&data, self.max_summary_chars);

        match tokio::time::timeout(self.timeout, self.provider.summarize(data)).await {
            Ok(Ok(summary)) => summary,
            Ok(Err(e)) => {
                warn!("Summary generation failed: {}", e);
                unavailable(e)
            }
            Err(_) => unavailable(ProviderError::Timeout(self.timeout)),
        }
    }
}

fn unavailable(error: impl std::fmt::Display) -> String {
    format!("Summary unavailable. (Error: {})", error)
}

/// Longest prefix of `s` with at most `max_chars` characters
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
