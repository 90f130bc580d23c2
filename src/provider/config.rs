use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::provider::ProviderError;

/// Wire dialect of the chat-completions endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Azure,
}

/// Configuration for the language-model provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// `openai` or `azure` (default: openai)
    pub kind: ProviderKind,

    /// Full chat-completions URL for OpenAI, resource URL for Azure
    pub endpoint: String,

    /// Model name, or deployment name for Azure
    pub model: String,

    /// Azure API version, 2024-02-01 or later for JSON mode (ignored for OpenAI)
    pub api_version: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Sampling temperature (default: 0.0)
    pub temperature: f32,

    /// Upper bound on a single provider call in seconds (default: 60)
    pub timeout_secs: u64,

    /// Markup sent for strategy inference is cut to this many characters (default: 30000)
    pub max_input_chars: usize,

    /// Data sent for summaries is cut to this many characters (default: 8000)
    pub max_summary_chars: usize,

    /// Number of items sampled for a summary (default: 15)
    pub summary_sample_size: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_version: "2024-06-01".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
            max_input_chars: 30_000,
            max_summary_chars: 8_000,
            summary_sample_size: 15,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, ProviderError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ProviderError::MissingCredentials(self.api_key_env.clone())),
        }
    }

    /// URL the completion requests are posted to
    pub fn completions_url(&self) -> String {
        match self.kind {
            ProviderKind::OpenAi => self.endpoint.clone(),
            ProviderKind::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.endpoint.trim_end_matches('/'),
                self.model,
                self.api_version
            ),
        }
    }
}
