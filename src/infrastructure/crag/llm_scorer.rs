//! LLM-based document scorer
//!
//! Asks the model for a relevance score in `[0, 1]` for each document.

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::crag::{DocumentScorer, ScoredDocument};
use crate::domain::{Document, DomainError, PromptChain};

pub const EVALUATION_PROMPT: &str = "On a scale from 0 to 1, how relevant is the following \
document to the query? Query: ${var:query}\nDocument: ${var:document}\n\
Respond with a JSON object of the form {\"relevance_score\": <number between 0 and 1>}.";

/// Response structure from LLM scoring
#[derive(Debug, Deserialize)]
struct RelevanceOutput {
    relevance_score: f32,
}

/// Document scorer that uses an LLM for evaluation
#[derive(Debug)]
pub struct LlmDocumentScorer {
    chain: PromptChain,
}

impl LlmDocumentScorer {
    pub fn new(chain: PromptChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl DocumentScorer for LlmDocumentScorer {
    async fn score_document(
        &self,
        query: &str,
        document: &Document,
    ) -> Result<ScoredDocument, DomainError> {
        let output: RelevanceOutput = self
            .chain
            .invoke_structured(&[("query", query), ("document", &document.content)])
            .await?;

        let raw = output.relevance_score;
        let score = raw.clamp(0.0, 1.0);
        if score != raw {
            warn!(document_id = %document.id, raw, "Relevance score outside [0, 1], clamped");
        }

        debug!(document_id = %document.id, score, "Document scored");

        Ok(ScoredDocument::new(document.clone(), score))
    }

    /// Scores concurrently; results keep the input order
    async fn score_documents(
        &self,
        query: &str,
        documents: &[Document],
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        try_join_all(documents.iter().map(|d| self.score_document(query, d))).await
    }

    fn scorer_name(&self) -> &'static str {
        "llm"
    }
}
