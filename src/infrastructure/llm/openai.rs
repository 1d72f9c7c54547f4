use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::llm::LlmResponseFormat;
use crate::domain::{DomainError, FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, Usage};
use crate::infrastructure::observability::{record_llm_request, LlmRequestMetricParams};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI-compatible chat completions provider
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if let Some(top_p) = request.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        if request.response_format == LlmResponseFormat::JsonObject {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());

        let mut llm_response = LlmResponse::new(response.id, response.model, message);

        if let Some(reason) = choice.finish_reason {
            llm_response = llm_response.with_finish_reason(FinishReason::parse(&reason));
        }

        if let Some(usage) = response.usage {
            llm_response = llm_response.with_usage(Usage::new(
                usage.prompt_tokens,
                usage.completion_tokens,
            ));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let start = Instant::now();
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);

        let result = match self.client.post_json(&url, self.headers(), &body).await {
            Ok(json) => self.parse_response(json),
            Err(e) => Err(e),
        };

        let usage = result.as_ref().ok().and_then(|r| r.usage.as_ref());
        record_llm_request(LlmRequestMetricParams {
            provider: self.provider_name(),
            model,
            duration: start.elapsed(),
            success: result.is_ok(),
            input_tokens: usage.map(|u| u64::from(u.prompt_tokens)),
            output_tokens: usage.map(|u| u64::from(u.completion_tokens)),
        });

        if let Err(ref e) = result {
            tracing::warn!(model = %model, error = %e, "Chat completion failed");
        }

        result
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

impl OpenAiMessage {
    fn from_domain(message: &Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    id: String,
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
