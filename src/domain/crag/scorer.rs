//! Document scoring trait and types

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// A document with its relevance score in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub relevance_score: f32,
}

impl ScoredDocument {
    pub fn new(document: Document, relevance_score: f32) -> Self {
        Self {
            document,
            relevance_score,
        }
    }
}

/// Trait for scoring document relevance.
///
/// Every document is scored on its own; scores are never normalised across
/// the set.
#[async_trait]
pub trait DocumentScorer: Send + Sync + Debug {
    /// Score a single document's relevance to a query
    async fn score_document(
        &self,
        query: &str,
        document: &Document,
    ) -> Result<ScoredDocument, DomainError>;

    /// Score multiple documents, preserving input order.
    /// Default implementation scores documents sequentially
    async fn score_documents(
        &self,
        query: &str,
        documents: &[Document],
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        let mut results = Vec::with_capacity(documents.len());

        for document in documents {
            results.push(self.score_document(query, document).await?);
        }

        Ok(results)
    }

    /// Get the scorer name
    fn scorer_name(&self) -> &'static str;
}
