use ::scraper::{ElementRef, Html, Selector};
use regex::Regex;

use crate::app::{Result, ScrapeError};
use crate::domain::{ScrapedItem, UNKNOWN_TITLE};
use crate::scraper::ScraperConfig;

/// Heuristic extractor turning item container markup into [`ScrapedItem`]s
pub struct ItemExtractor {
    title_selector: Selector,
    anchor_selector: Selector,
    price_pattern: Regex,
    min_text_len: usize,
    snippet_len: usize,
}

impl ItemExtractor {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let price_pattern = Regex::new(&config.price_pattern)
            .map_err(|e| ScrapeError::Config(format!("Invalid price pattern: {}", e)))?;

        Ok(Self {
            title_selector: parse_selector(&config.title_selectors)?,
            anchor_selector: parse_selector("a")?,
            price_pattern,
            min_text_len: config.min_text_len,
            snippet_len: config.snippet_len,
        })
    }

    /// Extract every useful item from a list of container fragments.
    ///
    /// Fragments that are too short or carry neither a title nor a price
    /// are skipped silently.
    pub fn extract(&self, fragments: &[String]) -> Vec<ScrapedItem> {
        fragments
            .iter()
            .filter_map(|fragment| self.extract_one(fragment))
            .collect()
    }

    /// Extract a single item from one container fragment
    pub fn extract_one(&self, fragment: &str) -> Option<ScrapedItem> {
        let document = Html::parse_fragment(fragment);
        let text = plain_text(document.root_element());

        if text.chars().count() < self.min_text_len {
            return None;
        }

        let first_anchor = document.select(&self.anchor_selector).next();

        // Headings first, then the first link's text
        let title = document
            .select(&self.title_selector)
            .next()
            .map(plain_text)
            .filter(|t| !t.is_empty())
            .or_else(|| first_anchor.map(plain_text).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let item = ScrapedItem {
            title,
            price: self
                .price_pattern
                .find(&text)
                .map(|m| m.as_str().to_string()),
            link: first_anchor
                .and_then(|a| a.value().attr("href"))
                .map(String::from),
            snippet: Some(text.chars().take(self.snippet_len).collect()),
        };

        item.is_useful().then_some(item)
    }
}

/// Text nodes trimmed and joined with single spaces
pub(crate) fn plain_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::Config(format!("Invalid selector '{}': {}", selector, e)))
}
