//! Category to retrieval strategy mapping

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Category;
use crate::domain::DomainError;

/// How a strategy derives its sub-queries before similarity search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategyKind {
    /// The query itself
    Direct,
    /// One LLM-rewritten query
    Rewriting,
    /// The query plus a more general step-back query
    StepBack,
    /// The query plus a hypothetical answer document
    Hyde,
    /// Three related queries
    Fusion,
    /// Three simpler sub-queries
    Decomposition,
}

impl RetrievalStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Rewriting => "rewriting",
            Self::StepBack => "step_back",
            Self::Hyde => "hyde",
            Self::Fusion => "fusion",
            Self::Decomposition => "decomposition",
        }
    }
}

impl fmt::Display for RetrievalStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total mapping from every category to a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyRegistry {
    mapping: HashMap<Category, RetrievalStrategyKind>,
}

impl StrategyRegistry {
    /// Build a registry, rejecting one that leaves a category unmapped
    pub fn new(mapping: HashMap<Category, RetrievalStrategyKind>) -> Result<Self, DomainError> {
        if let Some(missing) = Category::ALL.iter().find(|c| !mapping.contains_key(*c)) {
            return Err(DomainError::unknown_category(missing.as_str()));
        }

        Ok(Self { mapping })
    }

    /// Build from configuration labels (e.g. `factual = "rewriting"`)
    pub fn from_labels(
        labels: &HashMap<String, RetrievalStrategyKind>,
    ) -> Result<Self, DomainError> {
        let mut mapping = HashMap::with_capacity(labels.len());

        for (label, kind) in labels {
            let category =
                Category::parse_label(label).ok_or_else(|| DomainError::unknown_category(label))?;
            mapping.insert(category, *kind);
        }

        Self::new(mapping)
    }

    /// Strategy registered for a category
    pub fn strategy_for(&self, category: Category) -> Result<RetrievalStrategyKind, DomainError> {
        self.mapping
            .get(&category)
            .copied()
            .ok_or_else(|| DomainError::unknown_category(category.as_str()))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self {
            mapping: HashMap::from([
                (Category::Factual, RetrievalStrategyKind::Rewriting),
                (Category::Analytical, RetrievalStrategyKind::Fusion),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let registry = StrategyRegistry::default();

        assert_eq!(
            registry.strategy_for(Category::Factual).unwrap(),
            RetrievalStrategyKind::Rewriting
        );
        assert_eq!(
            registry.strategy_for(Category::Analytical).unwrap(),
            RetrievalStrategyKind::Fusion
        );
    }

    #[test]
    fn test_incomplete_registry_is_rejected() {
        let mapping = HashMap::from([(Category::Factual, RetrievalStrategyKind::Direct)]);
        let err = StrategyRegistry::new(mapping).unwrap_err();

        assert!(matches!(
            err,
            DomainError::UnknownCategory { ref category } if category == "Analytical"
        ));
    }

    #[test]
    fn test_unmapped_category_is_an_error() {
        let registry = StrategyRegistry {
            mapping: HashMap::from([(Category::Factual, RetrievalStrategyKind::Direct)]),
        };

        assert!(matches!(
            registry.strategy_for(Category::Analytical),
            Err(DomainError::UnknownCategory { ref category }) if category == "Analytical"
        ));
    }

    #[test]
    fn test_from_labels() {
        let labels = HashMap::from([
            ("factual".to_string(), RetrievalStrategyKind::Hyde),
            ("Analytical".to_string(), RetrievalStrategyKind::Decomposition),
        ]);
        let registry = StrategyRegistry::from_labels(&labels).unwrap();

        assert_eq!(
            registry.strategy_for(Category::Factual).unwrap(),
            RetrievalStrategyKind::Hyde
        );
    }

    #[test]
    fn test_from_labels_unknown_category() {
        let labels = HashMap::from([
            ("factual".to_string(), RetrievalStrategyKind::Direct),
            ("analytical".to_string(), RetrievalStrategyKind::Direct),
            ("opinion".to_string(), RetrievalStrategyKind::Direct),
        ]);

        assert!(matches!(
            StrategyRegistry::from_labels(&labels),
            Err(DomainError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_strategy_kind_serde() {
        let kind: RetrievalStrategyKind = serde_json::from_str(r#""step_back""#).unwrap();
        assert_eq!(kind, RetrievalStrategyKind::StepBack);
    }
}
