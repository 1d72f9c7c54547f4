//! Retrieval strategies: each derives a sub-query set, then searches once
//! per sub-query

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    Document, DomainError, KnowledgeBaseProvider, PipelineStage, PromptChain,
    RetrievalStrategyKind, StageExt,
};

pub const REWRITE_PROMPT: &str = "You are an AI assistant tasked with reformulating user queries \
to improve retrieval in a RAG system. Given the original query, rewrite it to be more specific, \
detailed, and likely to retrieve relevant information.\n\n\
Original query: ${var:query}\n\nRewritten query:";

pub const STEP_BACK_PROMPT: &str = "You are an AI assistant tasked with generating broader, more \
general queries to improve context retrieval in a RAG system. Given the original query, generate \
a step-back query that is more general and can help retrieve relevant background information.\n\n\
Original query: ${var:query}\n\nStep-back query:";

pub const HYDE_PROMPT: &str = "Given the question '${var:query}', generate a hypothetical \
document that directly answers this question. The document should be detailed and in-depth. \
The document size has to be exactly ${var:chunk_size} characters.";

pub const FUSION_PROMPT: &str = "You are a helpful assistant that generates multiple search \
queries based on a single input query.\nGenerate multiple search queries related to: \
${var:query}\n\
Respond with a JSON object with the keys \"query1\", \"query2\" and \"query3\".";

pub const DECOMPOSITION_PROMPT: &str = "You are an AI assistant tasked with breaking down complex \
queries into simpler sub-queries for a RAG system. Given the original query, decompose it into 3 \
simpler sub-queries that, when answered together, would provide a comprehensive response to the \
original query.\n\nOriginal query: ${var:query}\n\
Respond with a JSON object with the keys \"query1\", \"query2\" and \"query3\".";

/// Structured output shared by fusion and decomposition
#[derive(Debug, Deserialize)]
struct MultipleQueries {
    query1: String,
    query2: String,
    query3: String,
}

impl MultipleQueries {
    fn into_vec(self) -> Vec<String> {
        vec![self.query1, self.query2, self.query3]
    }
}

/// Query transformation chains, one per LLM-backed strategy
#[derive(Debug, Clone)]
pub struct StrategyChains {
    pub rewrite: PromptChain,
    pub step_back: PromptChain,
    pub hyde: PromptChain,
    pub fusion: PromptChain,
    pub decomposition: PromptChain,
}

/// Derived sub-queries and the documents found for them
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub sub_queries: Vec<String>,
    pub documents: Vec<Document>,
}

/// Executes any retrieval strategy variant against a knowledge base
#[derive(Debug, Clone)]
pub struct RetrievalStrategies {
    knowledge_base: Arc<dyn KnowledgeBaseProvider>,
    chains: StrategyChains,
    hyde_chunk_size: usize,
}

impl RetrievalStrategies {
    pub fn new(knowledge_base: Arc<dyn KnowledgeBaseProvider>, chains: StrategyChains) -> Self {
        Self {
            knowledge_base,
            chains,
            hyde_chunk_size: 500,
        }
    }

    pub fn with_hyde_chunk_size(mut self, chunk_size: usize) -> Self {
        self.hyde_chunk_size = chunk_size;
        self
    }

    /// Sub-queries the strategy searches for, in search order
    pub async fn sub_queries(
        &self,
        kind: RetrievalStrategyKind,
        query: &str,
    ) -> Result<Vec<String>, DomainError> {
        let vars = [("query", query)];

        let queries = match kind {
            RetrievalStrategyKind::Direct => vec![query.to_string()],
            RetrievalStrategyKind::Rewriting => {
                vec![self.chains.rewrite.invoke_text(&vars).await?]
            }
            RetrievalStrategyKind::StepBack => {
                let step_back = self.chains.step_back.invoke_text(&vars).await?;
                vec![query.to_string(), step_back]
            }
            RetrievalStrategyKind::Hyde => {
                let chunk_size = self.hyde_chunk_size.to_string();
                let document = self
                    .chains
                    .hyde
                    .invoke_text(&[("query", query), ("chunk_size", &chunk_size)])
                    .await?;
                vec![query.to_string(), document]
            }
            RetrievalStrategyKind::Fusion => self
                .chains
                .fusion
                .invoke_structured::<MultipleQueries>(&vars)
                .await?
                .into_vec(),
            RetrievalStrategyKind::Decomposition => self
                .chains
                .decomposition
                .invoke_structured::<MultipleQueries>(&vars)
                .await?
                .into_vec(),
        };

        Ok(queries)
    }

    /// Derive the sub-queries and search `k` documents for each.
    ///
    /// Results are concatenated in sub-query order without deduplication.
    pub async fn retrieve(
        &self,
        kind: RetrievalStrategyKind,
        query: &str,
        k: usize,
    ) -> Result<StrategyOutcome, DomainError> {
        let sub_queries = self.sub_queries(kind, query).await?;

        debug!(strategy = %kind, sub_queries = ?sub_queries, "Sub-queries derived");

        let documents = self
            .knowledge_base
            .similarity_search(&sub_queries, k)
            .await
            .at_stage(PipelineStage::Retrieval)?;

        Ok(StrategyOutcome {
            sub_queries,
            documents,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::chains;
    use super::*;
    use crate::domain::knowledge_base::MockKnowledgeBaseProvider;
    use crate::domain::llm::MockLlmProvider;

    const QUERY: &str = "How do I make people like me?";

    fn provider() -> Arc<MockLlmProvider> {
        Arc::new(
            MockLlmProvider::new("mock")
                .on("reformulating user queries", "How can I become likeable to others?")
                .on("step-back query", "What makes people likeable?")
                .on("hypothetical document", "Be genuinely interested in other people.")
                .on(
                    "multiple search queries",
                    r#"{"query1": "likeable habits", "query2": "first impressions", "query3": "smiling"}"#,
                )
                .on(
                    "simpler sub-queries",
                    r#"{"query1": "What is likeability?", "query2": "How to listen?", "query3": "How to praise?"}"#,
                ),
        )
    }

    fn strategies(kb: Arc<MockKnowledgeBaseProvider>) -> RetrievalStrategies {
        RetrievalStrategies::new(kb, chains(provider()))
    }

    #[tokio::test]
    async fn test_sub_queries_per_strategy() {
        let s = strategies(Arc::new(MockKnowledgeBaseProvider::new()));

        assert_eq!(
            s.sub_queries(RetrievalStrategyKind::Direct, QUERY).await.unwrap(),
            vec![QUERY]
        );
        assert_eq!(
            s.sub_queries(RetrievalStrategyKind::Rewriting, QUERY).await.unwrap(),
            vec!["How can I become likeable to others?"]
        );
        assert_eq!(
            s.sub_queries(RetrievalStrategyKind::StepBack, QUERY).await.unwrap(),
            vec![QUERY, "What makes people likeable?"]
        );
        assert_eq!(
            s.sub_queries(RetrievalStrategyKind::Hyde, QUERY).await.unwrap(),
            vec![QUERY, "Be genuinely interested in other people."]
        );
        assert_eq!(
            s.sub_queries(RetrievalStrategyKind::Fusion, QUERY).await.unwrap(),
            vec!["likeable habits", "first impressions", "smiling"]
        );
        assert_eq!(
            s.sub_queries(RetrievalStrategyKind::Decomposition, QUERY)
                .await
                .unwrap()
                .len(),
            3
        );
    }

    #[tokio::test]
    async fn test_hyde_prompt_carries_chunk_size() {
        let llm = provider();
        let s = RetrievalStrategies::new(Arc::new(MockKnowledgeBaseProvider::new()), chains(llm.clone()))
            .with_hyde_chunk_size(320);

        s.sub_queries(RetrievalStrategyKind::Hyde, QUERY).await.unwrap();

        let prompt = llm.requests()[0].prompt_text();
        assert!(prompt.contains("exactly 320 characters"));
    }

    #[tokio::test]
    async fn test_results_concatenated_in_sub_query_order() {
        let kb = Arc::new(
            MockKnowledgeBaseProvider::new()
                .with_query_results(QUERY, vec![Document::new("a", "A"), Document::new("b", "B")])
                .with_query_results("What makes people likeable?", vec![Document::new("a", "A")]),
        );
        let s = strategies(kb.clone());

        let outcome = s
            .retrieve(RetrievalStrategyKind::StepBack, QUERY, 2)
            .await
            .unwrap();

        let ids: Vec<&str> = outcome.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "a"]);
        assert_eq!(kb.queries(), vec![QUERY.to_string(), "What makes people likeable?".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_fusion_output() {
        let llm = Arc::new(MockLlmProvider::new("mock").with_response("just one query"));
        let s = RetrievalStrategies::new(Arc::new(MockKnowledgeBaseProvider::new()), chains(llm));

        let err = s
            .retrieve(RetrievalStrategyKind::Fusion, QUERY, 3)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "classification_contract_violation");
        assert_eq!(err.stage(), Some(PipelineStage::Retrieval));
    }

    #[tokio::test]
    async fn test_search_failure_is_tagged() {
        let s = strategies(Arc::new(MockKnowledgeBaseProvider::failing()));

        let err = s
            .retrieve(RetrievalStrategyKind::Direct, QUERY, 3)
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(PipelineStage::Retrieval));
        assert_eq!(err.kind(), "capability");
    }
}
