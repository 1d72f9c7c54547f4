//! Pinecone-backed knowledge base

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::{
    Document, DomainError, EmbeddingProvider, EmbeddingRequest, KnowledgeBaseProvider,
};
use crate::infrastructure::llm::HttpClientTrait;

/// Metadata field holding the chunk text
const TEXT_KEY: &str = "text";

#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub index_host: String,
    pub api_key: String,
    pub namespace: Option<String>,
}

impl PineconeConfig {
    pub fn new(index_host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            index_host: index_host.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

pub struct PineconeKnowledgeBase<C: HttpClientTrait> {
    client: C,
    config: PineconeConfig,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl<C: HttpClientTrait> std::fmt::Debug for PineconeKnowledgeBase<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeKnowledgeBase")
            .field("index_host", &self.config.index_host)
            .field("namespace", &self.config.namespace)
            .field("embedder", &self.embedder)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    metadata: HashMap<String, Value>,
}

impl<C: HttpClientTrait> PineconeKnowledgeBase<C> {
    pub fn new(client: C, config: PineconeConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            client,
            config,
            embedder,
        }
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Api-Key", self.config.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Document>, DomainError> {
        let url = format!("{}/query", self.config.index_host);

        let mut body = json!({
            "vector": vector,
            "topK": k,
            "includeMetadata": true,
        });

        if let Some(namespace) = &self.config.namespace {
            body["namespace"] = json!(namespace);
        }

        let json = self.client.post_json(&url, self.headers(), &body).await?;
        let response: QueryResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("pinecone", format!("Failed to parse query response: {}", e))
        })?;

        Ok(response.matches.into_iter().map(into_document).collect())
    }
}

fn into_document(found: QueryMatch) -> Document {
    let mut metadata = found.metadata;

    let content = match metadata.remove(TEXT_KEY) {
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
        None => {
            warn!(id = %found.id, "Pinecone match has no text metadata");
            String::new()
        }
    };

    Document {
        id: found.id,
        content,
        metadata,
    }
}

#[async_trait]
impl<C: HttpClientTrait> KnowledgeBaseProvider for PineconeKnowledgeBase<C> {
    fn provider_type(&self) -> &'static str {
        "pinecone"
    }

    async fn similarity_search(
        &self,
        queries: &[String],
        k: usize,
    ) -> Result<Vec<Document>, DomainError> {
        if queries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest::new(self.embedder.default_model(), queries.to_vec());
        let vectors = self.embedder.embed(request).await?.into_vectors();

        let mut results = Vec::new();
        for vector in &vectors {
            results.extend(self.query(vector, k).await?);
        }

        debug!(queries = queries.len(), k = k, results = results.len(), "Pinecone search");

        Ok(results)
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        let url = format!("{}/describe_index_stats", self.config.index_host);

        match self.client.post_json(&url, self.headers(), &json!({})).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Pinecone health check failed");
                Ok(false)
            }
        }
    }
}
