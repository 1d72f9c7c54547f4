//! CRAG pipeline
//!
//! Retrieve, score every document, then let the best score choose the
//! knowledge source: the best document, the web, or both.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::crag::{best_document, retrieved_citation, CragAction, CragAnswer, CragAssessment};
use crate::domain::web_search::{parse_search_results, render_citations};
use crate::domain::{
    CragConfig, Deadline, DocumentScorer, DomainError, KnowledgeBaseProvider, PipelineStage,
    PromptChain, SourceCitation, StageExt, WebSearchProvider,
};
use crate::infrastructure::observability::record_crag_action;

pub const REWRITE_PROMPT: &str = "Rewrite the following query to make it more suitable for a \
web search:\n${var:query}\n\
Respond with a JSON object of the form {\"query\": \"<rewritten query>\"}.";

pub const REFINEMENT_PROMPT: &str = "Extract the key information from the following document \
in bullet points:\n${var:document}\n\
Respond with a JSON object of the form {\"key_points\": \"<one bullet point per line>\"}.";

pub const GENERATION_PROMPT: &str = "Based on the following knowledge, answer the query. \
Include the sources with their links (if available) at the end of your answer:\n\
Query: ${var:query}\nKnowledge: ${var:knowledge}\nSources: ${var:sources}\nAnswer:";

#[derive(Debug, Deserialize)]
struct RewriteOutput {
    query: String,
}

#[derive(Debug, Deserialize)]
struct RefinementOutput {
    key_points: String,
}

/// Prompt chains used by the CRAG branches
#[derive(Debug, Clone)]
pub struct CragChains {
    pub rewrite: PromptChain,
    pub refine: PromptChain,
    pub generate: PromptChain,
}

/// CRAG pipeline over a knowledge base, a document scorer and web search
#[derive(Debug)]
pub struct CragPipeline {
    knowledge_base: Arc<dyn KnowledgeBaseProvider>,
    scorer: Arc<dyn DocumentScorer>,
    web_search: Arc<dyn WebSearchProvider>,
    chains: CragChains,
    config: CragConfig,
}

impl CragPipeline {
    pub fn new(
        knowledge_base: Arc<dyn KnowledgeBaseProvider>,
        scorer: Arc<dyn DocumentScorer>,
        web_search: Arc<dyn WebSearchProvider>,
        chains: CragChains,
        config: CragConfig,
    ) -> Self {
        Self {
            knowledge_base,
            scorer,
            web_search,
            chains,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &CragConfig {
        &self.config
    }

    pub async fn run(
        &self,
        query: &str,
        k: usize,
        deadline: &Deadline,
    ) -> Result<CragAnswer, DomainError> {
        deadline.check(PipelineStage::Retrieval)?;
        let documents = self
            .knowledge_base
            .similarity_search(&[query.to_string()], k)
            .await
            .at_stage(PipelineStage::Retrieval)?;

        deadline.check(PipelineStage::Scoring)?;
        let scored = self
            .scorer
            .score_documents(query, &documents)
            .await
            .at_stage(PipelineStage::Scoring)?;

        let assessment = CragAssessment::assess(&self.config, &scored)?;
        info!(
            action = assessment.action.as_str(),
            max_score = assessment.max_score,
            scores = ?assessment.scores,
            "CRAG branch selected"
        );
        record_crag_action(assessment.action.as_str());

        let (knowledge, citations) = match assessment.action {
            CragAction::Correct => {
                let best = best_document(&scored, &assessment)
                    .ok_or(DomainError::NoDocumentsRetrieved)?;
                (best.content.clone(), vec![retrieved_citation()])
            }
            CragAction::Incorrect => {
                let (web_knowledge, web_citations) = self.web_knowledge(query, deadline).await?;
                (web_knowledge.join("\n"), web_citations)
            }
            CragAction::Ambiguous => {
                let best = best_document(&scored, &assessment)
                    .ok_or(DomainError::NoDocumentsRetrieved)?;

                deadline.check(PipelineStage::Refinement)?;
                let mut knowledge = self.refine(&best.content).await?;
                let (web_knowledge, web_citations) = self.web_knowledge(query, deadline).await?;
                knowledge.extend(web_knowledge);

                let mut citations = vec![retrieved_citation()];
                citations.extend(web_citations);

                (knowledge.join("\n"), citations)
            }
        };

        let sources = render_citations(&citations);

        deadline.check(PipelineStage::Generation)?;
        let answer = self
            .chains
            .generate
            .invoke_text(&[
                ("query", query),
                ("knowledge", &knowledge),
                ("sources", &sources),
            ])
            .await?;

        let text = if sources.is_empty() {
            answer
        } else {
            format!("{}\n\nSources:\n{}", answer, sources)
        };

        Ok(CragAnswer {
            text,
            action: assessment.action,
            scores: assessment.scores,
            knowledge,
            citations,
        })
    }

    /// Rewrite the query, search the web and refine the results.
    ///
    /// Citations are best effort: malformed search output yields none.
    async fn web_knowledge(
        &self,
        query: &str,
        deadline: &Deadline,
    ) -> Result<(Vec<String>, Vec<SourceCitation>), DomainError> {
        deadline.check(PipelineStage::WebSearch)?;
        let rewritten: RewriteOutput = self
            .chains
            .rewrite
            .invoke_structured(&[("query", query)])
            .await?;
        let rewritten = rewritten.query.trim().to_string();

        debug!(rewritten = %rewritten, "Web search query rewritten");

        let raw = self
            .web_search
            .search(&rewritten)
            .await
            .at_stage(PipelineStage::WebSearch)?;

        deadline.check(PipelineStage::Refinement)?;
        let knowledge = self.refine(&raw).await?;

        let citations = parse_search_results(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding malformed web search citations");
            Vec::new()
        });

        Ok((knowledge, citations))
    }

    /// Bullet points extracted from a document, one per non-empty line
    async fn refine(&self, document: &str) -> Result<Vec<String>, DomainError> {
        let output: RefinementOutput = self
            .chains
            .refine
            .invoke_structured(&[("document", document)])
            .await?;

        Ok(split_key_points(&output.key_points))
    }
}

fn split_key_points(key_points: &str) -> Vec<String> {
    key_points
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
