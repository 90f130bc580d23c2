use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::provider::{OpenAiProvider, StrategyProvider, StrategyResolver};
use crate::scraper::{BrowserLauncher, ChromeLauncher, Orchestrator};

pub struct AppContext {
    pub config: Config,
    pub resolver: Arc<StrategyResolver>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppContext {
    /// Wire up Chrome and the configured model provider.
    ///
    /// Fails before any browser is started when the API key is missing.
    pub fn new(config: Config) -> Result<Self> {
        let provider: Arc<dyn StrategyProvider> =
            Arc::new(OpenAiProvider::from_env(&config.provider)?);
        let launcher: Arc<dyn BrowserLauncher> =
            Arc::new(ChromeLauncher::new(config.scraper.clone()));
        Self::with_components(config, provider, launcher)
    }

    pub fn with_components(
        config: Config,
        provider: Arc<dyn StrategyProvider>,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self> {
        let resolver = Arc::new(StrategyResolver::from_config(
            provider,
            &config.scraper,
            &config.provider,
        )?);
        let orchestrator = Arc::new(Orchestrator::new(
            launcher,
            resolver.clone(),
            config.scraper.clone(),
        )?);

        Ok(Self {
            config,
            resolver,
            orchestrator,
        })
    }
}
