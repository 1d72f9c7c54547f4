//! Adaptive retrieval: query classification, strategy dispatch and the
//! Adaptive RAG answer orchestrator

mod classifier;
mod rag;
mod retriever;
mod strategies;

pub use classifier::{LlmQueryClassifier, CLASSIFY_PROMPT};
pub use rag::{AdaptiveAnswer, AdaptiveOptions, AdaptiveRag, ANSWER_PROMPT};
pub use retriever::{AdaptiveRetrieval, AdaptiveRetriever};
pub use strategies::{
    RetrievalStrategies, StrategyChains, StrategyOutcome, DECOMPOSITION_PROMPT, FUSION_PROMPT,
    HYDE_PROMPT, REWRITE_PROMPT, STEP_BACK_PROMPT,
};
