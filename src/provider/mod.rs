//! Language-model strategy provider.
//!
//! - [`StrategyProvider`]: async trait the scraper calls for page analysis and summaries
//! - [`OpenAiProvider`]: OpenAI / Azure OpenAI chat-completions implementation
//! - [`StrategyResolver`]: wraps a provider with the fallbacks a run relies on

mod api;
mod config;
mod openai;
pub mod prompts;
mod resolver;

pub use config::{ProviderConfig, ProviderKind};
pub use openai::OpenAiProvider;
pub use resolver::{truncate_chars, StrategyResolver};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Strategy;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing credentials: environment variable {0} is not set")]
    MissingCredentials(String),
}

/// External model that infers scraping strategies and writes summaries
#[async_trait]
pub trait StrategyProvider: Send + Sync {
    /// Infer a strategy from cleaned page markup
    async fn analyze_structure(&self, markup: &str) -> Result<Strategy, ProviderError>;

    /// Write a short prose report about scraped data given as JSON
    async fn summarize(&self, data_json: &str) -> Result<String, ProviderError>;
}
