//! Application state for shared services

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{DomainError, Resource};
use crate::infrastructure::adaptive::AdaptiveOptions;
use crate::infrastructure::services::{PipelineDefaults, RagService, SearchResponse};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub rag_service: Arc<dyn RagServiceTrait>,
}

impl AppState {
    pub fn new(rag_service: Arc<dyn RagServiceTrait>) -> Self {
        Self { rag_service }
    }
}

/// Trait for RAG service operations
#[async_trait]
pub trait RagServiceTrait: Send + Sync {
    fn defaults(&self) -> PipelineDefaults;
    async fn search_resources(&self, query: &str, k: usize) -> Result<Vec<Resource>, DomainError>;
    async fn adaptive(
        &self,
        query: &str,
        options: AdaptiveOptions,
    ) -> Result<SearchResponse, DomainError>;
    async fn crag(&self, query: &str, k: usize) -> Result<SearchResponse, DomainError>;
    async fn self_rag(&self, query: &str, top_k: usize) -> Result<SearchResponse, DomainError>;
    async fn health_check(&self) -> Result<bool, DomainError>;
}

#[async_trait]
impl RagServiceTrait for RagService {
    fn defaults(&self) -> PipelineDefaults {
        RagService::defaults(self)
    }

    async fn search_resources(&self, query: &str, k: usize) -> Result<Vec<Resource>, DomainError> {
        RagService::search_resources(self, query, k).await
    }

    async fn adaptive(
        &self,
        query: &str,
        options: AdaptiveOptions,
    ) -> Result<SearchResponse, DomainError> {
        RagService::adaptive(self, query, options).await
    }

    async fn crag(&self, query: &str, k: usize) -> Result<SearchResponse, DomainError> {
        RagService::crag(self, query, k).await
    }

    async fn self_rag(&self, query: &str, top_k: usize) -> Result<SearchResponse, DomainError> {
        RagService::self_rag(self, query, top_k).await
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        RagService::health_check(self).await
    }
}
