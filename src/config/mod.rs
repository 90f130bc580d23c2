//! Configuration management for smartscrape.
//!
//! Configuration is read from `~/.config/smartscrape/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::provider::ProviderConfig;
use crate::scraper::ScraperConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub provider: ProviderConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, creating the commented default there if missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/smartscrape/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("smartscrape").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
    }

    fn default_config_content() -> &'static str {
        r##"# smartscrape configuration
#
# Every key is optional; anything left out falls back to the value shown.

[scraper]
# Run the browser without a visible window
headless = false

# Persistent browser profile; logins and cookies survive between runs.
# Only one run may use a profile at a time.
session_dir = "./browser_session"

# Default page budget for a run (overridden by --max-pages)
max_pages = 2

# Browser request timeout in seconds
timeout_secs = 30

# Pause after navigation, clicks and scrolls for late-rendering content (milliseconds)
settle_delay_ms = 2000

# How long to wait for the item container before using the fallback (milliseconds)
selector_timeout_ms = 3000

# Share of the page budget one infinite-scroll step consumes
scroll_step_weight = 0.5

# Container selector used when the inferred one matches nothing
fallback_selector = "article, div[class*='product'], div[class*='card'], div[class*='item'], li"

# Container selector of the single-page strategy used when analysis fails
default_strategy_selector = "article, div[class*='product'], div[class*='card'], li"

# Elements removed before the page is sent for analysis
noise_selectors = ["script", "style", "svg", "noscript", "iframe", "footer", "nav"]

# Elements whose text becomes an item title, first match wins
title_selectors = "h1, h2, h3, h4, strong"

# Candidates with less text than this are skipped
min_text_len = 5

# Length of the text preview kept per item
snippet_len = 150

# Browser window size
window_width = 1280
window_height = 800

# Custom user agent (optional)
# user_agent = "Mozilla/5.0 ..."

[provider]
# "openai" or "azure"
kind = "openai"

# Chat-completions URL for OpenAI; resource URL (https://NAME.openai.azure.com) for Azure
endpoint = "https://api.openai.com/v1/chat/completions"

# Model, or deployment name for Azure
model = "gpt-4o-mini"

# Azure API version (ignored for OpenAI); JSON replies need 2024-02-01 or later
api_version = "2024-06-01"

# Environment variable holding the API key
api_key_env = "OPENAI_API_KEY"

temperature = 0.0

# Upper bound on one model call in seconds
timeout_secs = 60

# Characters of page markup sent for analysis
max_input_chars = 30000

# Characters of item data sent for a summary, and how many items are sampled
max_summary_chars = 8000
summary_sample_size = 15
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderKind;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config = toml::from_str(Config::default_config_content())
            .expect("Default config should be valid TOML");

        let defaults = ScraperConfig::default();
        assert_eq!(config.scraper.max_pages, defaults.max_pages);
        assert_eq!(config.scraper.fallback_selector, defaults.fallback_selector);
        assert_eq!(
            config.scraper.default_strategy_selector,
            defaults.default_strategy_selector
        );
        assert_eq!(config.scraper.noise_selectors, defaults.noise_selectors);
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[scraper]
headless = true
max_pages = 5

[provider]
kind = "azure"
model = "scraper-deployment"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert!(config.scraper.headless);
        assert_eq!(config.scraper.max_pages, 5);
        assert_eq!(config.scraper.settle_delay_ms, 2000);
        assert_eq!(config.provider.kind, ProviderKind::Azure);
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.scraper.scroll_step_weight, 0.5);
        assert_eq!(config.provider.summary_sample_size, 15);
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.scraper.max_pages, 2);

        // The written file loads back
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.provider.max_input_chars, 30_000);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scraper]\nmax_pages = \"many\"\n").unwrap();

        match Config::load_from(&path) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
