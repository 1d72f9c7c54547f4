//! Category-driven strategy dispatch

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::strategies::RetrievalStrategies;
use crate::domain::{
    Category, CategorySelector, Deadline, Document, DomainError, PipelineStage, QueryClassifier,
    RetrievalStrategyKind, StrategyRegistry,
};

/// How the documents of one adaptive retrieval were obtained
#[derive(Debug, Clone, Serialize)]
pub struct AdaptiveRetrieval {
    pub category: Category,
    /// Whether the category came from the classifier rather than the caller
    pub classified: bool,
    pub strategy: RetrievalStrategyKind,
    pub sub_queries: Vec<String>,
    #[serde(skip)]
    pub documents: Vec<Document>,
}

pub struct AdaptiveRetriever {
    classifier: Arc<dyn QueryClassifier>,
    registry: StrategyRegistry,
    strategies: RetrievalStrategies,
}

impl fmt::Debug for AdaptiveRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveRetriever")
            .field("registry", &self.registry)
            .field("strategies", &self.strategies)
            .finish()
    }
}

impl AdaptiveRetriever {
    pub fn new(
        classifier: Arc<dyn QueryClassifier>,
        registry: StrategyRegistry,
        strategies: RetrievalStrategies,
    ) -> Self {
        Self {
            classifier,
            registry,
            strategies,
        }
    }

    /// Effective category: the caller's choice, or the classifier's for `Auto`
    pub async fn resolve_category(
        &self,
        query: &str,
        selector: CategorySelector,
    ) -> Result<(Category, bool), DomainError> {
        match selector {
            CategorySelector::Fixed(category) => Ok((category, false)),
            CategorySelector::Auto => Ok((self.classifier.classify(query).await?, true)),
        }
    }

    pub async fn get_relevant_documents(
        &self,
        query: &str,
        k: usize,
        selector: CategorySelector,
        deadline: &Deadline,
    ) -> Result<AdaptiveRetrieval, DomainError> {
        deadline.check(PipelineStage::Classification)?;
        let (category, classified) = self.resolve_category(query, selector).await?;
        let strategy = self.registry.strategy_for(category)?;

        deadline.check(PipelineStage::Retrieval)?;
        let outcome = self.strategies.retrieve(strategy, query, k).await?;

        info!(
            category = %category,
            classified = classified,
            strategy = %strategy,
            sub_queries = outcome.sub_queries.len(),
            documents = outcome.documents.len(),
            "Adaptive retrieval complete"
        );

        Ok(AdaptiveRetrieval {
            category,
            classified,
            strategy,
            sub_queries: outcome.sub_queries,
            documents: outcome.documents,
        })
    }
}
