//! Pairwise (query, text) relevance scoring

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Cross-encoder style scorer: one score per `(query, text)` pair, in input order
#[async_trait]
pub trait PairwiseScorer: Send + Sync + Debug {
    async fn score(&self, query: &str, texts: &[String]) -> Result<Vec<f32>, DomainError>;

    /// Get the scorer name
    fn scorer_name(&self) -> &'static str;
}
