use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::domain::{Strategy, StrategyResponse};
use crate::provider::api::{ApiMessage, ApiRequest, ApiResponse, ResponseFormat};
use crate::provider::prompts::{analysis_prompt, summary_prompt, SYSTEM_PROMPT};
use crate::provider::{ProviderConfig, ProviderError, ProviderKind, StrategyProvider};

/// OpenAI-compatible chat-completions provider (OpenAI or Azure OpenAI)
pub struct OpenAiProvider {
    client: Client,
    api_url: String,
    api_key: String,
    kind: ProviderKind,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig, api_key: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(concat!("smartscrape/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.completions_url(),
            api_key,
            kind: config.kind,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Create a provider with the key read from the configured environment variable
    pub fn from_env(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key()?;
        Self::new(config, api_key)
    }

    fn build_request(&self, messages: Vec<ApiMessage>, json_mode: bool) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            response_format: json_mode.then(ResponseFormat::json_object),
        }
    }

    async fn complete(&self, request: &ApiRequest) -> Result<String, ProviderError> {
        let builder = self.client.post(&self.api_url).json(request);
        let builder = match self.kind {
            ProviderKind::OpenAi => builder.bearer_auth(&self.api_key),
            ProviderKind::Azure => builder.header("api-key", &self.api_key),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError { status, message });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        api_response
            .into_content()
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::MalformedResponse("empty completion".to_string()))
    }
}

#[async_trait]
impl StrategyProvider for OpenAiProvider {
    async fn analyze_structure(&self, markup: &str) -> Result<Strategy, ProviderError> {
        let request = self.build_request(
            vec![
                ApiMessage::system(SYSTEM_PROMPT),
                ApiMessage::user(analysis_prompt(markup)),
            ],
            true,
        );
        let content = self.complete(&request).await?;
        debug!("Strategy response: {}", content);
        parse_strategy(&content)
    }

    async fn summarize(&self, data_json: &str) -> Result<String, ProviderError> {
        let request = self.build_request(vec![ApiMessage::user(summary_prompt(data_json))], false);
        self.complete(&request).await
    }
}

/// Parse a strategy from model output, tolerating Markdown code fences
pub fn parse_strategy(content: &str) -> Result<Strategy, ProviderError> {
    let json = strip_code_fence(content);
    let response: StrategyResponse = serde_json::from_str(json)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid strategy JSON: {}", e)))?;

    response.into_strategy().ok_or_else(|| {
        ProviderError::MalformedResponse("empty item container selector".to_string())
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
