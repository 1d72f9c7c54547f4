//! Explicit prompt -> model -> parser stage
//!
//! Every LLM-backed step of the pipelines (classification, rewriting,
//! scoring, generation) is one `PromptChain` with its own template, model
//! settings and the pipeline stage it reports failures under.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::PromptTemplate;
use crate::domain::error::{DomainError, PipelineStage, StageExt};
use crate::domain::llm::{LlmProvider, LlmRequest};

/// How many characters of an unparseable model reply end up in errors
const MAX_LABEL_CHARS: usize = 80;

/// Model and sampling settings for one chain
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl ModelSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            top_p: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p.clamp(0.0, 1.0));
        self
    }
}

/// A prompt template bound to a provider and model settings
#[derive(Debug, Clone)]
pub struct PromptChain {
    name: &'static str,
    stage: PipelineStage,
    template: PromptTemplate,
    provider: Arc<dyn LlmProvider>,
    settings: ModelSettings,
}

impl PromptChain {
    pub fn new(
        name: &'static str,
        stage: PipelineStage,
        template: &str,
        provider: Arc<dyn LlmProvider>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            name,
            stage,
            template: PromptTemplate::new(template),
            provider,
            settings,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Render the prompt for the given variables
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String, DomainError> {
        let values: HashMap<&str, &str> = vars.iter().copied().collect();
        self.template
            .render(&values)
            .map_err(|e| DomainError::internal(format!("prompt '{}': {}", self.name, e)))
    }

    /// Run the chain and return the trimmed text reply
    pub async fn invoke_text(&self, vars: &[(&str, &str)]) -> Result<String, DomainError> {
        let prompt = self.render(vars)?;
        let request = self.request_builder(prompt).build();
        let reply = self.send(request).await?;

        Ok(reply.trim().to_string())
    }

    /// Run the chain in JSON mode and parse the reply into `T`.
    ///
    /// A reply that does not match the schema is a contract violation of the
    /// model at this chain's stage.
    pub async fn invoke_structured<T>(&self, vars: &[(&str, &str)]) -> Result<T, DomainError>
    where
        T: DeserializeOwned,
    {
        let prompt = self.render(vars)?;
        let request = self.request_builder(prompt).json_output().build();
        let reply = self.send(request).await?;

        let json = extract_json(&reply).unwrap_or(reply.as_str());

        serde_json::from_str(json).map_err(|e| {
            warn!(chain = self.name, error = %e, "Structured output did not match schema");
            DomainError::contract_violation(self.stage, truncate(reply.trim()))
        })
    }

    fn request_builder(&self, prompt: String) -> crate::domain::llm::LlmRequestBuilder {
        let mut builder = LlmRequest::builder().user(prompt);

        if let Some(temperature) = self.settings.temperature {
            builder = builder.temperature(temperature);
        }

        if let Some(top_p) = self.settings.top_p {
            builder = builder.top_p(top_p);
        }

        builder
    }

    async fn send(&self, request: LlmRequest) -> Result<String, DomainError> {
        debug!(
            chain = self.name,
            stage = %self.stage,
            model = %self.settings.model,
            "Invoking prompt chain"
        );

        let response = self
            .provider
            .chat(&self.settings.model, request)
            .await
            .at_stage(self.stage)?;

        Ok(response.content().to_string())
    }
}

/// Extract a JSON object from a string (handles markdown code blocks)
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;

    (start < end).then(|| &text[start..=end])
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_LABEL_CHARS).collect()
}
