//! Adaptive retrieval domain - query categories and strategy dispatch

mod category;
mod classifier;
mod registry;

pub use category::{Category, CategorySelector};
pub use classifier::QueryClassifier;
pub use registry::{RetrievalStrategyKind, StrategyRegistry};

#[cfg(test)]
pub use classifier::MockQueryClassifier;
