//! Reranking domain - reorder candidates by a pairwise relevance score

mod reranker;
mod scorer;

pub use reranker::{RankedDocument, Reranker};
pub use scorer::PairwiseScorer;

#[cfg(test)]
pub use scorer::mock::MockPairwiseScorer;
