use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::OpenAiProvider;
use crate::config::{secret_from_env, LlmConfig};
use crate::domain::{DomainError, LlmProvider, ModelSettings};

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the chat provider described by configuration.
    ///
    /// The API key is read from the environment variable named in
    /// `api_key_env`.
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let api_key = secret_from_env(&config.api_key_env)?;
        Self::create_with_key(config, api_key)
    }

    pub fn create_with_key(
        config: &LlmConfig,
        api_key: impl Into<String>,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let http_client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;
        let provider = OpenAiProvider::with_base_url(http_client, api_key, &config.base_url);

        Ok(Arc::new(provider))
    }

    /// Settings for answer generation and classification
    pub fn primary_settings(config: &LlmConfig) -> ModelSettings {
        ModelSettings::new(&config.model)
            .with_temperature(config.temperature)
            .with_top_p(config.top_p)
    }

    /// Settings for the cheaper intermediate steps
    pub fn fast_settings(config: &LlmConfig) -> ModelSettings {
        ModelSettings::new(&config.fast_model)
            .with_temperature(config.temperature)
            .with_top_p(config.top_p)
    }
}
