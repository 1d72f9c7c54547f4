//! Self-RAG domain - critique vocabularies and best-candidate selection

mod candidate;
mod labels;

pub use candidate::{select_best, Candidate, SelfRagAnswer, SelfRagPath};
pub use labels::{
    parse_utility, Relevance, RetrievalDecision, SupportLevel, NO_RELEVANT_CONTEXT,
    NO_RETRIEVAL_NECESSARY,
};
