//! Knowledge base provider trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::Document;
use crate::domain::error::DomainError;

/// Provider trait for vector similarity search.
///
/// Each query is searched independently for at most `k` documents; results
/// are concatenated in query order, then rank order within each query.
/// Duplicates across queries are kept.
#[async_trait]
pub trait KnowledgeBaseProvider: Send + Sync + Debug {
    /// Get the provider type name
    fn provider_type(&self) -> &'static str;

    /// Search the knowledge base once per query
    async fn similarity_search(
        &self,
        queries: &[String],
        k: usize,
    ) -> Result<Vec<Document>, DomainError>;

    /// Check if the knowledge base is healthy and accessible
    async fn health_check(&self) -> Result<bool, DomainError>;
}
