use serde::{Deserialize, Serialize};

use super::Message;

/// Output format requested from the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmResponseFormat {
    #[default]
    Text,
    JsonObject,
}

/// Parameters for LLM generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub response_format: LlmResponseFormat,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            top_p: None,
            max_tokens: None,
            response_format: LlmResponseFormat::Text,
        }
    }

    pub fn builder() -> LlmRequestBuilder {
        LlmRequestBuilder::new()
    }

    /// Concatenated text of every message, mostly useful for logging and mocks
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builder for LlmRequest
#[derive(Debug, Default)]
pub struct LlmRequestBuilder {
    messages: Vec<Message>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    max_tokens: Option<u32>,
    response_format: LlmResponseFormat,
}

impl LlmRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(Message::system(content))
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(Message::user(content))
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn json_output(mut self) -> Self {
        self.response_format = LlmResponseFormat::JsonObject;
        self
    }

    pub fn build(self) -> LlmRequest {
        LlmRequest {
            messages: self.messages,
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            response_format: self.response_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LlmRequest::builder()
            .system("You are a helpful assistant")
            .user("Hello!")
            .temperature(0.8)
            .top_p(0.5)
            .build();

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.8));
        assert_eq!(request.top_p, Some(0.5));
        assert_eq!(request.response_format, LlmResponseFormat::Text);
    }

    #[test]
    fn test_json_output() {
        let request = LlmRequest::builder().user("Classify").json_output().build();
        assert_eq!(request.response_format, LlmResponseFormat::JsonObject);
    }

    #[test]
    fn test_prompt_text() {
        let request = LlmRequest::builder().system("a").user("b").build();
        assert_eq!(request.prompt_text(), "a\nb");
    }
}
