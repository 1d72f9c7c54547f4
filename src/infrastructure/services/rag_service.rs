//! RAG service - routes a question, runs the requested pipeline and shapes
//! the caller-facing response

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use super::context::RagContext;
use crate::config::AppConfig;
use crate::domain::{
    Category, CategorySelector, CragAction, Deadline, DomainError, KnowledgeBaseProvider,
    ModelSettings, PipelineStage, PromptChain, Reranker, Resource, RetrievalStrategyKind,
    SelfRagPath, SourceCitation, StageExt, StrategyRegistry, SupportLevel,
};
use crate::infrastructure::adaptive::{
    AdaptiveOptions, AdaptiveRag, AdaptiveRetriever, LlmQueryClassifier, RetrievalStrategies,
    StrategyChains, ANSWER_PROMPT, CLASSIFY_PROMPT, DECOMPOSITION_PROMPT, FUSION_PROMPT,
    HYDE_PROMPT, REWRITE_PROMPT as QUERY_REWRITE_PROMPT, STEP_BACK_PROMPT,
};
use crate::infrastructure::crag::{
    CragChains, CragPipeline, LlmDocumentScorer, EVALUATION_PROMPT,
    GENERATION_PROMPT as CRAG_GENERATION_PROMPT, REFINEMENT_PROMPT, REWRITE_PROMPT,
};
use crate::infrastructure::llm::LlmProviderFactory;
use crate::infrastructure::observability::record_pipeline_run;
use crate::infrastructure::routing::{TopicRouter, ROUTING_PROMPT};
use crate::infrastructure::self_rag::{
    SelfRagChains, SelfRagPipeline, GENERATION_PROMPT as SELF_RAG_GENERATION_PROMPT,
    RELEVANCE_PROMPT, RETRIEVAL_PROMPT, SUPPORT_PROMPT, UTILITY_PROMPT,
};

/// Prefix of every answer given outside of the corpus topic
pub const OUT_OF_DOMAIN_PREFIX: &str =
    "This question is not related to the book !! This is the answer based on my knowledge :\n\n";

pub const FALLBACK_PROMPT: &str = "Answer the question. If you can't answer the question, \
reply \"I don't know\".\nQuestion: ${var:question}";

const CRAG_HEADER: &str = "Result of CRAG: \n\n";
const SELF_RAG_HEADER: &str = "Result of Self-RAG: \n\n";

/// Pipeline a request asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    Adaptive,
    Crag,
    SelfRag,
}

impl PipelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adaptive => "adaptive",
            Self::Crag => "crag",
            Self::SelfRag => "self_rag",
        }
    }
}

/// Observable decisions of the pipeline that produced an answer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineDetails {
    /// The router judged the question off-topic
    OutOfDomain,
    Adaptive {
        category: Category,
        classified: bool,
        strategy: RetrievalStrategyKind,
        sub_queries: Vec<String>,
        reranked: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        rerank_scores: Option<Vec<f32>>,
    },
    Crag {
        action: CragAction,
        scores: Vec<f32>,
        citations: Vec<SourceCitation>,
    },
    SelfRag {
        path: SelfRagPath,
        #[serde(skip_serializing_if = "Option::is_none")]
        support: Option<SupportLevel>,
        #[serde(skip_serializing_if = "Option::is_none")]
        utility: Option<u8>,
        retrieved: usize,
        relevant: usize,
        excluded: usize,
    },
}

impl PipelineDetails {
    pub fn is_out_of_domain(&self) -> bool {
        matches!(self, Self::OutOfDomain)
    }
}

/// Answer returned by every pipeline endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub text: String,
    pub resources: Vec<Resource>,
    pub pipeline: PipelineKind,
    pub details: PipelineDetails,
}

/// Request defaults taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct PipelineDefaults {
    pub search_k: usize,
    pub adaptive: AdaptiveOptions,
    pub crag_k: usize,
    pub self_rag_top_k: usize,
}

/// Facade over the three pipelines and the topical router
pub struct RagService {
    knowledge_base: Arc<dyn KnowledgeBaseProvider>,
    router: Option<TopicRouter>,
    fallback: PromptChain,
    adaptive: AdaptiveRag,
    crag: CragPipeline,
    self_rag: SelfRagPipeline,
    defaults: PipelineDefaults,
    request_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for RagService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagService")
            .field("router", &self.router.is_some())
            .field("defaults", &self.defaults)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl RagService {
    /// Wire every prompt chain and orchestrator over the shared context
    pub fn new(context: &RagContext, config: &AppConfig) -> Result<Self, DomainError> {
        let primary = LlmProviderFactory::primary_settings(&config.llm);
        let fast = LlmProviderFactory::fast_settings(&config.llm);
        let chain = |name: &'static str, stage, template: &str, settings: &ModelSettings| {
            PromptChain::new(name, stage, template, context.llm.clone(), settings.clone())
        };

        let classifier = LlmQueryClassifier::new(chain(
            "classify",
            PipelineStage::Classification,
            CLASSIFY_PROMPT,
            &primary,
        ));
        let strategies = RetrievalStrategies::new(
            context.knowledge_base.clone(),
            StrategyChains {
                rewrite: chain("rewrite", PipelineStage::Retrieval, QUERY_REWRITE_PROMPT, &fast),
                step_back: chain("step_back", PipelineStage::Retrieval, STEP_BACK_PROMPT, &fast),
                hyde: chain("hyde", PipelineStage::Retrieval, HYDE_PROMPT, &fast),
                fusion: chain("fusion", PipelineStage::Retrieval, FUSION_PROMPT, &fast),
                decomposition: chain(
                    "decomposition",
                    PipelineStage::Retrieval,
                    DECOMPOSITION_PROMPT,
                    &fast,
                ),
            },
        )
        .with_hyde_chunk_size(config.pipelines.adaptive.hyde_chunk_size);
        let registry = StrategyRegistry::from_labels(&config.pipelines.adaptive.strategies)?;

        let mut adaptive = AdaptiveRag::new(
            AdaptiveRetriever::new(Arc::new(classifier), registry, strategies),
            chain("answer", PipelineStage::Generation, ANSWER_PROMPT, &primary),
        );
        if let Some(scorer) = &context.pairwise_scorer {
            adaptive = adaptive.with_reranker(Reranker::new(scorer.clone()));
        }

        let crag = CragPipeline::new(
            context.knowledge_base.clone(),
            Arc::new(LlmDocumentScorer::new(chain(
                "evaluate",
                PipelineStage::Scoring,
                EVALUATION_PROMPT,
                &fast,
            ))),
            context.web_search.clone(),
            CragChains {
                rewrite: chain("web_rewrite", PipelineStage::WebSearch, REWRITE_PROMPT, &fast),
                refine: chain("refine", PipelineStage::Refinement, REFINEMENT_PROMPT, &fast),
                generate: chain(
                    "crag_generate",
                    PipelineStage::Generation,
                    CRAG_GENERATION_PROMPT,
                    &primary,
                ),
            },
            config.pipelines.crag.clone(),
        );

        let self_rag = SelfRagPipeline::new(
            context.knowledge_base.clone(),
            SelfRagChains {
                retrieval: chain("necessity", PipelineStage::Classification, RETRIEVAL_PROMPT, &fast),
                relevance: chain("relevance", PipelineStage::Scoring, RELEVANCE_PROMPT, &fast),
                generation: chain(
                    "self_rag_generate",
                    PipelineStage::Generation,
                    SELF_RAG_GENERATION_PROMPT,
                    &primary,
                ),
                support: chain("support", PipelineStage::Scoring, SUPPORT_PROMPT, &fast),
                utility: chain("utility", PipelineStage::Scoring, UTILITY_PROMPT, &fast),
            },
        );

        let router = config.router.enabled.then(|| {
            TopicRouter::new(
                chain("route", PipelineStage::Routing, ROUTING_PROMPT, &fast),
                &config.router.topic,
            )
        });

        let adaptive_config = &config.pipelines.adaptive;
        let defaults = PipelineDefaults {
            search_k: adaptive_config.k,
            adaptive: AdaptiveOptions {
                k: adaptive_config.k,
                rerank: adaptive_config.rerank,
                category: CategorySelector::Auto,
            },
            crag_k: config.pipelines.crag.k,
            self_rag_top_k: config.pipelines.self_rag.top_k,
        };

        Ok(Self {
            knowledge_base: context.knowledge_base.clone(),
            router,
            fallback: chain("fallback", PipelineStage::Generation, FALLBACK_PROMPT, &primary),
            adaptive,
            crag,
            self_rag,
            defaults,
            request_timeout_secs: config.pipelines.request_timeout_secs,
        })
    }

    pub fn defaults(&self) -> PipelineDefaults {
        self.defaults
    }

    /// Plain similarity search projected to resources
    pub async fn search_resources(&self, query: &str, k: usize) -> Result<Vec<Resource>, DomainError> {
        validate_request(query, k)?;

        let documents = self
            .knowledge_base
            .similarity_search(&[query.to_string()], k)
            .await
            .at_stage(PipelineStage::Retrieval)?;

        Resource::from_documents(&documents)
    }

    pub async fn adaptive(
        &self,
        query: &str,
        options: AdaptiveOptions,
    ) -> Result<SearchResponse, DomainError> {
        validate_request(query, options.k)?;

        self.gated(PipelineKind::Adaptive, query, |deadline| async move {
            let answer = self.adaptive.answer(query, options, &deadline).await?;
            let header = format!(
                "Rerank_mode : {}, query_category : {} \n\n",
                options.rerank, options.category
            );

            Ok(SearchResponse {
                text: header + &answer.text,
                resources: answer.resources,
                pipeline: PipelineKind::Adaptive,
                details: PipelineDetails::Adaptive {
                    category: answer.category,
                    classified: answer.classified,
                    strategy: answer.strategy,
                    sub_queries: answer.sub_queries,
                    reranked: answer.reranked,
                    rerank_scores: answer.rerank_scores,
                },
            })
        })
        .await
    }

    pub async fn crag(&self, query: &str, k: usize) -> Result<SearchResponse, DomainError> {
        validate_request(query, k)?;

        self.gated(PipelineKind::Crag, query, |deadline| async move {
            let answer = self.crag.run(query, k, &deadline).await?;

            Ok(SearchResponse {
                text: format!("{}{}", CRAG_HEADER, answer.text),
                resources: Vec::new(),
                pipeline: PipelineKind::Crag,
                details: PipelineDetails::Crag {
                    action: answer.action,
                    scores: answer.scores,
                    citations: answer.citations,
                },
            })
        })
        .await
    }

    pub async fn self_rag(&self, query: &str, top_k: usize) -> Result<SearchResponse, DomainError> {
        validate_request(query, top_k)?;

        self.gated(PipelineKind::SelfRag, query, |deadline| async move {
            let answer = self.self_rag.run(query, top_k, &deadline).await?;

            Ok(SearchResponse {
                text: format!("{}{}", SELF_RAG_HEADER, answer.text),
                resources: Vec::new(),
                pipeline: PipelineKind::SelfRag,
                details: PipelineDetails::SelfRag {
                    path: answer.path,
                    support: answer.support,
                    utility: answer.utility,
                    retrieved: answer.retrieved,
                    relevant: answer.relevant,
                    excluded: answer.excluded,
                },
            })
        })
        .await
    }

    /// Whether the vector store answers
    pub async fn health_check(&self) -> Result<bool, DomainError> {
        self.knowledge_base.health_check().await
    }

    /// Route the question, then either answer from general knowledge or run
    /// `pipeline` under a fresh request deadline. Records the run metrics.
    async fn gated<F, Fut>(
        &self,
        pipeline: PipelineKind,
        query: &str,
        run: F,
    ) -> Result<SearchResponse, DomainError>
    where
        F: FnOnce(Deadline) -> Fut,
        Fut: Future<Output = Result<SearchResponse, DomainError>>,
    {
        let start = Instant::now();
        let deadline = Deadline::from_secs(self.request_timeout_secs);

        let result = match self.in_domain(query, &deadline).await {
            Ok(true) => run(deadline).await,
            Ok(false) => self.answer_out_of_domain(pipeline, query, &deadline).await,
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(response) if response.details.is_out_of_domain() => "out_of_domain",
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        record_pipeline_run(pipeline.as_str(), outcome, start.elapsed());

        match &result {
            Ok(_) => info!(
                pipeline = pipeline.as_str(),
                outcome,
                duration_ms = start.elapsed().as_millis() as u64,
                "Pipeline completed"
            ),
            Err(e) => warn!(
                pipeline = pipeline.as_str(),
                outcome,
                stage = e.stage().map(|s| s.as_str()).unwrap_or("none"),
                error = %e,
                "Pipeline failed"
            ),
        }

        result
    }

    async fn in_domain(&self, query: &str, deadline: &Deadline) -> Result<bool, DomainError> {
        let Some(router) = &self.router else {
            return Ok(true);
        };

        deadline.check(PipelineStage::Routing)?;
        router.is_relevant(query).await
    }

    async fn answer_out_of_domain(
        &self,
        pipeline: PipelineKind,
        query: &str,
        deadline: &Deadline,
    ) -> Result<SearchResponse, DomainError> {
        deadline.check(PipelineStage::Generation)?;
        info!(pipeline = pipeline.as_str(), "Question is off-topic, answering without retrieval");

        let answer = self.fallback.invoke_text(&[("question", query)]).await?;

        Ok(SearchResponse {
            text: format!("{}{}", OUT_OF_DOMAIN_PREFIX, answer),
            resources: Vec::new(),
            pipeline,
            details: PipelineDetails::OutOfDomain,
        })
    }
}

fn validate_request(query: &str, k: usize) -> Result<(), DomainError> {
    if query.trim().is_empty() {
        return Err(DomainError::validation("Query must not be empty"));
    }

    if k == 0 {
        return Err(DomainError::validation("The number of documents must be at least 1"));
    }

    Ok(())
}
