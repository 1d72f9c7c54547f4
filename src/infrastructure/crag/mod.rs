//! CRAG (Corrective RAG) infrastructure: LLM relevance scoring and the
//! confidence-gated pipeline

mod llm_scorer;
mod pipeline;

pub use llm_scorer::{LlmDocumentScorer, EVALUATION_PROMPT};
pub use pipeline::{CragChains, CragPipeline, GENERATION_PROMPT, REFINEMENT_PROMPT, REWRITE_PROMPT};
