use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Container selector used when the inferred one matches nothing on a page
pub const FALLBACK_ITEM_SELECTOR: &str =
    "article, div[class*='product'], div[class*='card'], div[class*='item'], li";

/// Container selector of the strategy used when the provider fails
pub const DEFAULT_STRATEGY_SELECTOR: &str =
    "article, div[class*='product'], div[class*='card'], li";

/// Currency symbol then amount, or amount then ISO code.
///
/// Amounts may use either `,` or `.` as thousands and decimal separator.
pub const DEFAULT_PRICE_PATTERN: &str =
    r"[$£€¥₹]\s?[\d.,]*\d|[\d.,]*\d\s?(?:USD|EUR|GBP|INR|JPY|CAD|AUD)\b";

/// Configuration for the scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser without a window (default: false)
    pub headless: bool,

    /// Persistent browser profile, reused across runs to keep logins
    pub session_dir: PathBuf,

    /// Page budget for one run, inclusive (default: 2)
    pub max_pages: u32,

    /// Browser request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Pause after navigation, scrolling and clicks for deferred rendering in milliseconds (default: 2000)
    pub settle_delay_ms: u64,

    /// How long to wait for the item container selector in milliseconds (default: 3000)
    pub selector_timeout_ms: u64,

    /// Page budget consumed by one infinite-scroll step (default: 0.5)
    pub scroll_step_weight: f64,

    /// Broad container selector used when the inferred one is not found
    pub fallback_selector: String,

    /// Container selector of the strategy used when the provider fails
    pub default_strategy_selector: String,

    /// Elements stripped, with their subtrees, before strategy inference
    pub noise_selectors: Vec<String>,

    /// Elements whose text is taken as an item title, first match wins
    pub title_selectors: String,

    /// Regular expression for price tokens in item text
    pub price_pattern: String,

    /// Candidates with less plain text than this are ignored (default: 5)
    pub min_text_len: usize,

    /// Length of the plain-text preview kept per item (default: 150)
    pub snippet_len: usize,

    /// Browser viewport width (default: 1280)
    pub window_width: u32,

    /// Browser viewport height (default: 800)
    pub window_height: u32,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: false,
            session_dir: PathBuf::from("./browser_session"),
            max_pages: 2,
            timeout_secs: 30,
            settle_delay_ms: 2000,
            selector_timeout_ms: 3000,
            scroll_step_weight: 0.5,
            fallback_selector: FALLBACK_ITEM_SELECTOR.to_string(),
            default_strategy_selector: DEFAULT_STRATEGY_SELECTOR.to_string(),
            noise_selectors: vec![
                "script".to_string(),
                "style".to_string(),
                "svg".to_string(),
                "noscript".to_string(),
                "iframe".to_string(),
                "footer".to_string(),
                "nav".to_string(),
            ],
            title_selectors: "h1, h2, h3, h4, strong".to_string(),
            price_pattern: DEFAULT_PRICE_PATTERN.to_string(),
            min_text_len: 5,
            snippet_len: 150,
            window_width: 1280,
            window_height: 800,
            user_agent: None,
        }
    }
}

impl ScraperConfig {
    /// Get the browser request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the settle delay as a Duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Get the container selector wait as a Duration
    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ScraperConfig::default();
        assert!(!config.headless);
        assert_eq!(config.session_dir, PathBuf::from("./browser_session"));
        assert_eq!(config.max_pages, 2);
        assert_eq!(config.settle_delay_ms, 2000);
        assert_eq!(config.selector_timeout_ms, 3000);
        assert_eq!(config.scroll_step_weight, 0.5);
        assert_eq!(config.min_text_len, 5);
        assert_eq!(config.snippet_len, 150);
        assert_eq!(config.noise_selectors.len(), 7);
        assert!(config.fallback_selector.contains("div[class*='item']"));
        assert!(!config.default_strategy_selector.contains("div[class*='item']"));
    }

    #[test]
    fn test_durations() {
        let config = ScraperConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.settle_delay(), Duration::from_millis(2000));
        assert_eq!(config.selector_timeout(), Duration::from_millis(3000));
    }

    #[test]
    fn test_default_price_pattern_compiles() {
        assert!(regex::Regex::new(DEFAULT_PRICE_PATTERN).is_ok());
    }
}
