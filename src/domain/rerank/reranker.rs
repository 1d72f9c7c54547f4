//! Stable descending rerank over a pairwise scorer

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::PairwiseScorer;
use crate::domain::error::{PipelineStage, StageExt};
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// A document together with its rerank score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDocument {
    pub document: Document,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct Reranker {
    scorer: Arc<dyn PairwiseScorer>,
}

impl Reranker {
    pub fn new(scorer: Arc<dyn PairwiseScorer>) -> Self {
        Self { scorer }
    }

    /// Reorder all documents by descending score.
    ///
    /// Documents with equal scores keep their input order; nothing is dropped.
    pub async fn rerank(
        &self,
        query: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<RankedDocument>, DomainError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let scores = self
            .scorer
            .score(query, &texts)
            .await
            .at_stage(PipelineStage::Reranking)?;

        if scores.len() != documents.len() {
            return Err(DomainError::capability(
                PipelineStage::Reranking,
                DomainError::validation(format!(
                    "{} returned {} scores for {} documents",
                    self.scorer.scorer_name(),
                    scores.len(),
                    documents.len()
                )),
            ));
        }

        let ranked = sort_stable_descending(
            documents
                .into_iter()
                .zip(scores)
                .map(|(document, score)| RankedDocument { document, score })
                .collect(),
        );

        debug!(
            scorer = self.scorer.scorer_name(),
            scores = ?ranked.iter().map(|r| r.score).collect::<Vec<_>>(),
            "Reranked documents"
        );

        Ok(ranked)
    }
}

/// Stable sort by descending score; NaN sorts last
fn sort_stable_descending(mut ranked: Vec<RankedDocument>) -> Vec<RankedDocument> {
    ranked.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    });
    ranked
}
