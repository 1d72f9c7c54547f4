//! Process-wide capability handles, built once at startup

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::domain::{
    DomainError, KnowledgeBaseProvider, LlmProvider, PairwiseScorer, WebSearchProvider,
};
use crate::infrastructure::knowledge_base::KnowledgeBaseFactory;
use crate::infrastructure::llm::{HttpClient, LlmProviderFactory};
use crate::infrastructure::rerank::HttpCrossEncoder;
use crate::infrastructure::web_search::SearxngWebSearch;

/// External collaborators shared by every pipeline
#[derive(Debug, Clone)]
pub struct RagContext {
    pub llm: Arc<dyn LlmProvider>,
    pub knowledge_base: Arc<dyn KnowledgeBaseProvider>,
    /// Absent when reranking is disabled in configuration
    pub pairwise_scorer: Option<Arc<dyn PairwiseScorer>>,
    pub web_search: Arc<dyn WebSearchProvider>,
}

impl RagContext {
    /// Connect every collaborator described by configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let llm = LlmProviderFactory::create(&config.llm)?;

        let embedder = KnowledgeBaseFactory::create_embedder(&config.embedding)?;
        let knowledge_base = KnowledgeBaseFactory::create(&config.vector_store, embedder).await?;

        let pairwise_scorer: Option<Arc<dyn PairwiseScorer>> = if config.reranker.enabled {
            Some(Arc::new(HttpCrossEncoder::new(
                HttpClient::new(),
                &config.reranker.base_url,
            )))
        } else {
            None
        };

        let web_search = Arc::new(SearxngWebSearch::new(
            HttpClient::new(),
            &config.web_search.base_url,
            config.web_search.max_results,
        ));

        info!(
            llm = llm.provider_name(),
            knowledge_base = knowledge_base.provider_type(),
            reranker = pairwise_scorer.is_some(),
            "RAG context initialized"
        );

        Ok(Self {
            llm,
            knowledge_base,
            pairwise_scorer,
            web_search,
        })
    }
}
