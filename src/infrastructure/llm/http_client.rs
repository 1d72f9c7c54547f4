use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &Value,
    ) -> Result<Value, DomainError>;

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
    ) -> Result<Value, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, DomainError> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &Value,
    ) -> Result<Value, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        self.send(request.json(body)).await
    }

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
    ) -> Result<Value, DomainError> {
        let mut request = self.client.get(url).query(query);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        self.send(request).await
    }
}
