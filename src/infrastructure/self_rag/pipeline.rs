//! Self-RAG pipeline
//!
//! Decide whether to retrieve, keep only relevant contexts, generate one
//! candidate per context, critique each for support and utility, and return
//! the best one.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::self_rag::{
    parse_utility, select_best, Relevance, RetrievalDecision, NO_RELEVANT_CONTEXT,
    NO_RETRIEVAL_NECESSARY,
};
use crate::domain::{
    Candidate, Deadline, DomainError, KnowledgeBaseProvider, PipelineStage, PromptChain,
    SelfRagAnswer, SelfRagPath, StageExt, SupportLevel,
};

pub const RETRIEVAL_PROMPT: &str = "Given the query '${var:query}', determine whether the \
content in the book \"How to Win Friends and Influence People\" can answer the query. \
Respond with a JSON object {\"response\": \"Yes\"} or {\"response\": \"No\"}.";

pub const RELEVANCE_PROMPT: &str = "Given the query '${var:query}' and the context \
'${var:context}', determine if the context is relevant. \
Respond with a JSON object {\"response\": \"Relevant\"} or {\"response\": \"Irrelevant\"}.";

pub const GENERATION_PROMPT: &str = "Given the query '${var:query}' and the context \
'${var:context}', generate a response. \
Respond with a JSON object of the form {\"response\": \"<your answer>\"}.";

pub const SUPPORT_PROMPT: &str = "Given the response '${var:response}' and the context \
'${var:context}', determine if the response is supported by the context. \
Respond with a JSON object whose \"response\" is one of \"Fully supported\", \
\"Partially supported\" or \"No support\".";

pub const UTILITY_PROMPT: &str = "Given the query '${var:query}' and the response \
'${var:response}', rate the utility of the response from 1 to 5. \
Respond with a JSON object of the form {\"response\": <integer from 1 to 5>}.";

#[derive(Debug, Deserialize)]
struct TextOutput {
    response: String,
}

#[derive(Debug, Deserialize)]
struct UtilityOutput {
    response: Value,
}

/// Prompt chains of the Self-RAG loop
#[derive(Debug, Clone)]
pub struct SelfRagChains {
    pub retrieval: PromptChain,
    pub relevance: PromptChain,
    pub generation: PromptChain,
    pub support: PromptChain,
    pub utility: PromptChain,
}

#[derive(Debug)]
pub struct SelfRagPipeline {
    knowledge_base: Arc<dyn KnowledgeBaseProvider>,
    chains: SelfRagChains,
}

impl SelfRagPipeline {
    pub fn new(knowledge_base: Arc<dyn KnowledgeBaseProvider>, chains: SelfRagChains) -> Self {
        Self {
            knowledge_base,
            chains,
        }
    }

    pub async fn run(
        &self,
        query: &str,
        top_k: usize,
        deadline: &Deadline,
    ) -> Result<SelfRagAnswer, DomainError> {
        deadline.check(PipelineStage::Classification)?;
        let decision: TextOutput = self
            .chains
            .retrieval
            .invoke_structured(&[("query", query)])
            .await?;
        let decision = RetrievalDecision::parse(&decision.response)?;

        debug!(decision = ?decision, "Retrieval necessity decided");

        if decision == RetrievalDecision::Skip {
            deadline.check(PipelineStage::Generation)?;
            let text = self.generate(query, NO_RETRIEVAL_NECESSARY).await?;
            return Ok(SelfRagAnswer::direct(text, SelfRagPath::NoRetrieval, 0));
        }

        deadline.check(PipelineStage::Retrieval)?;
        let documents = self
            .knowledge_base
            .similarity_search(&[query.to_string()], top_k)
            .await
            .at_stage(PipelineStage::Retrieval)?;
        let retrieved = documents.len();

        deadline.check(PipelineStage::Scoring)?;
        let relevance = try_join_all(
            documents
                .iter()
                .map(|doc| self.relevance(query, &doc.content)),
        )
        .await?;

        let contexts: Vec<&str> = documents
            .iter()
            .zip(relevance)
            .filter(|(_, r)| *r == Relevance::Relevant)
            .map(|(doc, _)| doc.content.as_str())
            .collect();

        info!(retrieved, relevant = contexts.len(), "Relevant contexts filtered");

        if contexts.is_empty() {
            deadline.check(PipelineStage::Generation)?;
            let text = self.generate(query, NO_RELEVANT_CONTEXT).await?;
            return Ok(SelfRagAnswer::direct(
                text,
                SelfRagPath::NoRelevantContext,
                retrieved,
            ));
        }

        let mut candidates = Vec::with_capacity(contexts.len());
        let mut last_error = None;

        for (index, context) in contexts.iter().enumerate() {
            deadline.check(PipelineStage::Generation)?;
            let text = self.generate(query, context).await?;

            deadline.check(PipelineStage::Scoring)?;
            match self.critique(query, context, &text).await {
                Ok((support, utility)) => {
                    debug!(index, support = ?support, utility, "Candidate scored");
                    candidates.push(Candidate {
                        text,
                        context_index: index,
                        support,
                        utility,
                    });
                }
                Err(e @ DomainError::MalformedUtilityScore { .. }) => return Err(e),
                Err(e) => {
                    warn!(index, error = %e, "Excluding candidate that could not be scored");
                    last_error = Some(e);
                }
            }
        }

        let excluded = contexts.len() - candidates.len();

        let Some(best) = select_best(&candidates) else {
            return Err(last_error.unwrap_or_else(|| {
                DomainError::internal("Self-RAG produced no candidates")
            }));
        };

        info!(
            support = ?best.support,
            utility = best.utility,
            candidates = candidates.len(),
            excluded,
            "Self-RAG candidate selected"
        );

        Ok(SelfRagAnswer {
            text: best.text.clone(),
            path: SelfRagPath::Candidates,
            support: Some(best.support),
            utility: Some(best.utility),
            retrieved,
            relevant: contexts.len(),
            excluded,
        })
    }

    async fn relevance(&self, query: &str, context: &str) -> Result<Relevance, DomainError> {
        let output: TextOutput = self
            .chains
            .relevance
            .invoke_structured(&[("query", query), ("context", context)])
            .await?;

        Relevance::parse(&output.response)
    }

    async fn generate(&self, query: &str, context: &str) -> Result<String, DomainError> {
        let output: TextOutput = self
            .chains
            .generation
            .invoke_structured(&[("query", query), ("context", context)])
            .await?;

        Ok(output.response)
    }

    /// Support label and utility rating of one candidate
    async fn critique(
        &self,
        query: &str,
        context: &str,
        response: &str,
    ) -> Result<(SupportLevel, u8), DomainError> {
        let support: TextOutput = self
            .chains
            .support
            .invoke_structured(&[("response", response), ("context", context)])
            .await?;
        let support = SupportLevel::parse(&support.response)?;

        // An unparseable reply is a malformed score, not an excludable failure
        let utility: UtilityOutput = self
            .chains
            .utility
            .invoke_structured(&[("query", query), ("response", response)])
            .await
            .map_err(|e| match e {
                DomainError::ClassificationContractViolation { label, .. } => {
                    DomainError::malformed_utility(label)
                }
                other => other,
            })?;
        let utility = parse_utility(&utility.response)?;

        Ok((support, utility))
    }
}
