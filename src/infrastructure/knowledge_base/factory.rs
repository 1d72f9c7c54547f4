//! Knowledge base provider factory

use std::sync::Arc;

use crate::config::{secret_from_env, EmbeddingConfig, VectorStoreConfig};
use crate::domain::{DomainError, EmbeddingProvider, KnowledgeBaseProvider};
use crate::infrastructure::embedding::OpenAiEmbeddingProvider;
use crate::infrastructure::llm::HttpClient;

use super::in_memory::InMemoryKnowledgeBase;
use super::pinecone::{PineconeConfig, PineconeKnowledgeBase};

/// Factory for creating knowledge base providers
#[derive(Debug)]
pub struct KnowledgeBaseFactory;

impl KnowledgeBaseFactory {
    /// Create the embedding provider shared by every store
    pub fn create_embedder(
        config: &EmbeddingConfig,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let api_key = secret_from_env(&config.api_key_env)?;
        let provider = OpenAiEmbeddingProvider::with_base_url(
            HttpClient::new(),
            api_key,
            &config.model,
            &config.base_url,
        );

        Ok(Arc::new(provider))
    }

    /// Create a knowledge base provider from configuration
    pub async fn create(
        config: &VectorStoreConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Arc<dyn KnowledgeBaseProvider>, DomainError> {
        match config {
            VectorStoreConfig::InMemory { corpus_path } => {
                let kb = InMemoryKnowledgeBase::load(corpus_path, embedder).await?;
                Ok(Arc::new(kb))
            }
            VectorStoreConfig::Pinecone {
                index_host,
                api_key_env,
                namespace,
            } => {
                let mut pinecone = PineconeConfig::new(index_host, secret_from_env(api_key_env)?);
                if let Some(namespace) = namespace {
                    pinecone = pinecone.with_namespace(namespace);
                }

                Ok(Arc::new(PineconeKnowledgeBase::new(
                    HttpClient::new(),
                    pinecone,
                    embedder,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;

    #[tokio::test]
    async fn test_in_memory_missing_corpus() {
        let config = VectorStoreConfig::InMemory {
            corpus_path: "/nonexistent/corpus.json".into(),
        };
        let embedder = Arc::new(MockEmbeddingProvider::new(&["a"]));

        let err = KnowledgeBaseFactory::create(&config, embedder).await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_pinecone_requires_api_key() {
        let config = VectorStoreConfig::Pinecone {
            index_host: "https://idx.svc.pinecone.io".to_string(),
            api_key_env: "PMP_RAG_TEST_UNSET_PINECONE_KEY".to_string(),
            namespace: None,
        };
        let embedder = Arc::new(MockEmbeddingProvider::new(&["a"]));

        let err = KnowledgeBaseFactory::create(&config, embedder).await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
