//! OpenAI-compatible embedding provider

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI embedding provider (`/v1/embeddings`)
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            model: model.into(),
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(
        &self,
        json: serde_json::Value,
        expected: usize,
    ) -> Result<EmbeddingResponse, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        if response.data.len() != expected {
            return Err(DomainError::provider(
                "openai",
                format!("Expected {} embeddings, got {}", expected, response.data.len()),
            ));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        Ok(EmbeddingResponse::new(
            response.model,
            data.into_iter().map(|d| d.embedding).collect(),
        ))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        if request.inputs().is_empty() {
            return Ok(EmbeddingResponse::new(request.model(), Vec::new()));
        }

        let body = serde_json::json!({
            "model": request.model(),
            "input": request.inputs(),
        });

        let response = self
            .client
            .post_json(&self.embeddings_url(), self.headers(), &body)
            .await?;

        self.parse_response(response, request.inputs().len())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    model: String,
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/embeddings";
    const MODEL: &str = "text-embedding-3-small";

    fn create_mock_response(indices: &[usize], dimensions: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = indices
            .iter()
            .map(|&i| {
                let embedding: Vec<f32> = (0..dimensions).map(|j| (i * 10 + j) as f32).collect();
                serde_json::json!({ "index": i, "embedding": embedding, "object": "embedding" })
            })
            .collect();

        serde_json::json!({
            "model": MODEL,
            "data": data,
            "usage": { "prompt_tokens": 10, "total_tokens": 10 }
        })
    }

    #[tokio::test]
    async fn test_embed_single_text() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(&[0], 4));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key", MODEL);

        let response = provider
            .embed(EmbeddingRequest::single(MODEL, "Hello world"))
            .await
            .unwrap();

        assert_eq!(response.model(), MODEL);
        assert_eq!(response.vectors(), [vec![0.0, 1.0, 2.0, 3.0]]);
    }

    #[tokio::test]
    async fn test_embed_batch_is_ordered_by_index() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, create_mock_response(&[1, 0], 2));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key", MODEL);

        let request = EmbeddingRequest::new(MODEL, vec!["a".into(), "b".into()]);
        let response = provider.embed(request).await.unwrap();

        assert_eq!(response.vectors(), [vec![0.0, 1.0], vec![10.0, 11.0]]);
    }

    #[tokio::test]
    async fn test_embed_count_mismatch() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(&[0], 2));
        let provider = OpenAiEmbeddingProvider::new(client, "k", MODEL);

        let request = EmbeddingRequest::new(MODEL, vec!["a".into(), "b".into()]);
        assert!(provider.embed(request).await.is_err());
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "Rate limit exceeded");
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key", MODEL);

        let result = provider.embed(EmbeddingRequest::single(MODEL, "Hello")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let custom_url = "http://localhost:8080/v1/embeddings";
        let client = MockHttpClient::new().with_response(custom_url, create_mock_response(&[0], 3));
        let provider =
            OpenAiEmbeddingProvider::with_base_url(client, "test-key", MODEL, "http://localhost:8080");

        let response = provider.embed(EmbeddingRequest::single(MODEL, "Test")).await.unwrap();

        assert_eq!(response.vectors().len(), 1);
        assert_eq!(provider.default_model(), MODEL);
    }
}
