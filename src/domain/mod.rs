//! Domain layer - Core RAG types, capability traits and decision rules

pub mod crag;
pub mod deadline;
pub mod embedding;
pub mod error;
pub mod knowledge_base;
pub mod llm;
pub mod prompt;
pub mod rerank;
pub mod retrieval;
pub mod self_rag;
pub mod web_search;

pub use crag::{CragAction, CragAnswer, CragAssessment, CragConfig, DocumentScorer, ScoredDocument};
pub use deadline::Deadline;
pub use embedding::{cosine_similarity, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use error::{DomainError, PipelineStage, StageExt};
pub use knowledge_base::{Document, KnowledgeBaseProvider, Resource};
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, LlmResponseFormat,
    Message, MessageRole, Usage,
};
pub use prompt::{extract_json, ModelSettings, PromptChain, PromptTemplate, TemplateError};
pub use rerank::{PairwiseScorer, RankedDocument, Reranker};
pub use retrieval::{
    Category, CategorySelector, QueryClassifier, RetrievalStrategyKind, StrategyRegistry,
};
pub use self_rag::{Candidate, SelfRagAnswer, SelfRagPath, SupportLevel};
pub use web_search::{SourceCitation, WebSearchProvider};
