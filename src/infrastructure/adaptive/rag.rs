//! Adaptive RAG: adaptive retrieval, optional rerank, then generation

use serde::Serialize;
use tracing::{info, warn};

use super::retriever::AdaptiveRetriever;
use crate::domain::{
    Category, CategorySelector, Deadline, DomainError, PipelineStage, PromptChain, Reranker,
    Resource, RetrievalStrategyKind,
};

pub const ANSWER_PROMPT: &str = "Use the following pieces of context to answer the question at \
the end. If you don't know the answer, just say that you don't know, don't try to make up an \
answer.\n\n${var:context}\n\nQuestion: ${var:question}\nAnswer:";

/// Caller options for one adaptive request
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveOptions {
    pub k: usize,
    pub rerank: bool,
    pub category: CategorySelector,
}

impl Default for AdaptiveOptions {
    fn default() -> Self {
        Self {
            k: 5,
            rerank: true,
            category: CategorySelector::Auto,
        }
    }
}

/// Generated answer plus the retrieval decisions behind it
#[derive(Debug, Clone, Serialize)]
pub struct AdaptiveAnswer {
    pub text: String,
    pub resources: Vec<Resource>,
    pub category: Category,
    pub classified: bool,
    pub strategy: RetrievalStrategyKind,
    pub sub_queries: Vec<String>,
    pub reranked: bool,
    /// Rerank scores in final document order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_scores: Option<Vec<f32>>,
}

#[derive(Debug)]
pub struct AdaptiveRag {
    retriever: AdaptiveRetriever,
    reranker: Option<Reranker>,
    generator: PromptChain,
}

impl AdaptiveRag {
    pub fn new(retriever: AdaptiveRetriever, generator: PromptChain) -> Self {
        Self {
            retriever,
            reranker: None,
            generator,
        }
    }

    pub fn with_reranker(mut self, reranker: Reranker) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub async fn answer(
        &self,
        query: &str,
        options: AdaptiveOptions,
        deadline: &Deadline,
    ) -> Result<AdaptiveAnswer, DomainError> {
        let retrieval = self
            .retriever
            .get_relevant_documents(query, options.k, options.category, deadline)
            .await?;

        let mut documents = retrieval.documents;
        let mut rerank_scores = None;

        match (&self.reranker, options.rerank) {
            (Some(reranker), true) => {
                deadline.check(PipelineStage::Reranking)?;
                let ranked = reranker.rerank(query, documents).await?;
                rerank_scores = Some(ranked.iter().map(|r| r.score).collect());
                documents = ranked.into_iter().map(|r| r.document).collect();
            }
            (None, true) => warn!("Rerank requested but no reranker is configured"),
            _ => {}
        }

        let resources = Resource::from_documents(&documents)?;
        let context = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        deadline.check(PipelineStage::Generation)?;
        let text = self
            .generator
            .invoke_text(&[("context", &context), ("question", query)])
            .await?;

        info!(
            documents = documents.len(),
            reranked = rerank_scores.is_some(),
            "Adaptive answer generated"
        );

        Ok(AdaptiveAnswer {
            text,
            resources,
            category: retrieval.category,
            classified: retrieval.classified,
            strategy: retrieval.strategy,
            sub_queries: retrieval.sub_queries,
            reranked: rerank_scores.is_some(),
            rerank_scores,
        })
    }
}
