//! Self-RAG infrastructure: the generate-critique-select loop

mod pipeline;

pub use pipeline::{
    SelfRagChains, SelfRagPipeline, GENERATION_PROMPT, RELEVANCE_PROMPT, RETRIEVAL_PROMPT,
    SUPPORT_PROMPT, UTILITY_PROMPT,
};
