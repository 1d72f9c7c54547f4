//! In-memory knowledge base: a JSON corpus embedded at startup and searched
//! by cosine similarity

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    cosine_similarity, Document, DomainError, EmbeddingProvider, EmbeddingRequest,
    KnowledgeBaseProvider,
};

/// One record of the corpus file
#[derive(Debug, Deserialize)]
struct CorpusEntry {
    #[serde(default)]
    id: Option<String>,
    content: String,
    #[serde(default)]
    metadata: HashMap<String, Value>,
}

#[derive(Debug)]
struct StoredDoc {
    document: Document,
    embedding: Vec<f32>,
}

#[derive(Debug)]
pub struct InMemoryKnowledgeBase {
    embedder: Arc<dyn EmbeddingProvider>,
    documents: Vec<StoredDoc>,
}

impl InMemoryKnowledgeBase {
    /// Load a corpus file (`[{id, content, metadata}]`) and embed every entry
    pub async fn load(
        path: impl AsRef<Path>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::configuration(format!("Cannot read corpus '{}': {}", path.display(), e))
        })?;

        let entries: Vec<CorpusEntry> = serde_json::from_str(&raw).map_err(|e| {
            DomainError::configuration(format!("Invalid corpus '{}': {}", path.display(), e))
        })?;

        let documents = entries
            .into_iter()
            .map(|entry| Document {
                id: entry.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                content: entry.content,
                metadata: entry.metadata,
            })
            .collect();

        let kb = Self::from_documents(documents, embedder).await?;
        info!(path = %path.display(), documents = kb.len(), "Corpus loaded");

        Ok(kb)
    }

    pub async fn from_documents(
        documents: Vec<Document>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let request = EmbeddingRequest::new(embedder.default_model(), texts);
        let vectors = embedder.embed(request).await?.into_vectors();

        if vectors.len() != documents.len() {
            return Err(DomainError::provider(
                embedder.provider_name(),
                format!(
                    "Expected {} corpus embeddings, got {}",
                    documents.len(),
                    vectors.len()
                ),
            ));
        }

        let documents = documents
            .into_iter()
            .zip(vectors)
            .map(|(document, embedding)| StoredDoc { document, embedding })
            .collect();

        Ok(Self { embedder, documents })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Top `k` documents for one query vector; ties keep corpus order
    fn top_k(&self, query: &[f32], k: usize) -> Vec<Document> {
        let mut scored: Vec<(f32, &StoredDoc)> = self
            .documents
            .iter()
            .map(|doc| (cosine_similarity(query, &doc.embedding), doc))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(k)
            .map(|(_, doc)| doc.document.clone())
            .collect()
    }
}

#[async_trait]
impl KnowledgeBaseProvider for InMemoryKnowledgeBase {
    fn provider_type(&self) -> &'static str {
        "in_memory"
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

        if vectors.len() != queries.len() {
            return Err(DomainError::provider(
                self.embedder.provider_name(),
                format!(
                    "Expected {} query embeddings, got {}",
                    queries.len(),
                    vectors.len()
                ),
            ));
        }

        let results: Vec<Document> = vectors
            .iter()
            .flat_map(|vector| self.top_k(vector, k))
            .collect();

        debug!(
            queries = queries.len(),
            k = k,
            results = results.len(),
            "In-memory similarity search"
        );

        Ok(results)
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(!self.documents.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use std::io::Write;

    const VOCABULARY: [&str; 4] = ["smile", "listen", "name", "praise"];

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("1", "Smile. A smile costs nothing.").with_metadata("title", "Smile"),
            Document::new("2", "Listen and let others talk about themselves."),
            Document::new("3", "Remember a person's name; the name is the sweetest sound."),
            Document::new("4", "Give honest and sincere praise."),
        ]
    }

    async fn knowledge_base() -> InMemoryKnowledgeBase {
        let embedder = Arc::new(MockEmbeddingProvider::new(&VOCABULARY));
        InMemoryKnowledgeBase::from_documents(corpus(), embedder).await.unwrap()
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let kb = knowledge_base().await;

        let results = kb
            .similarity_search(&["why should I remember a name".to_string()], 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "3");
    }

    #[tokio::test]
    async fn test_results_are_concatenated_per_query() {
        let kb = knowledge_base().await;
        let queries = vec!["smile more".to_string(), "praise people".to_string()];

        let results = kb.similarity_search(&queries, 2).await.unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].id, "1");
        assert_eq!(results[2].id, "4");
    }

    #[tokio::test]
    async fn test_k_larger_than_corpus() {
        let kb = knowledge_base().await;
        let results = kb.similarity_search(&["smile".to_string()], 10).await.unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_queries() {
        let kb = knowledge_base().await;
        assert!(kb.similarity_search(&[], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_corpus_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("pmp-rag-corpus-{}.json", Uuid::new_v4()));

        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"content": "Smile", "metadata": {{"topic": "t", "title": "Smile", "principle": "p"}}}}]"#
        )
        .unwrap();

        let embedder = Arc::new(MockEmbeddingProvider::new(&VOCABULARY));
        let kb = InMemoryKnowledgeBase::load(&path, embedder).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(kb.len(), 1);
        assert!(kb.health_check().await.unwrap());
        assert!(!kb.documents[0].document.id.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let embedder = Arc::new(MockEmbeddingProvider::new(&VOCABULARY));
        let err = InMemoryKnowledgeBase::load("/nonexistent/corpus.json", embedder)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    /// Embeds only the first input of every request
    #[derive(Debug)]
    struct TruncatingEmbedder(MockEmbeddingProvider);

    #[async_trait]
    impl EmbeddingProvider for TruncatingEmbedder {
        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<crate::domain::EmbeddingResponse, DomainError> {
            let model = request.model().to_string();
            let mut vectors = self.0.embed(request).await?.into_vectors();
            vectors.truncate(1);
            Ok(crate::domain::EmbeddingResponse::new(model, vectors))
        }

        fn provider_name(&self) -> &'static str {
            "truncating"
        }

        fn default_model(&self) -> &str {
            self.0.default_model()
        }
    }

    #[tokio::test]
    async fn test_short_query_embedding_response_is_an_error() {
        let kb = knowledge_base().await;
        let short = InMemoryKnowledgeBase {
            embedder: Arc::new(TruncatingEmbedder(MockEmbeddingProvider::new(&VOCABULARY))),
            documents: kb.documents,
        };
        let queries = vec!["smile more".to_string(), "praise people".to_string()];

        let err = short.similarity_search(&queries, 2).await.unwrap_err();

        assert!(matches!(err, DomainError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let kb = knowledge_base().await;
        let failing = InMemoryKnowledgeBase {
            embedder: Arc::new(MockEmbeddingProvider::new(&VOCABULARY).with_error("down")),
            documents: kb.documents,
        };

        assert!(failing.similarity_search(&["smile".to_string()], 1).await.is_err());
    }
}
