//! Query parameters of the search endpoints

use serde::Deserialize;

use crate::domain::CategorySelector;
use crate::infrastructure::adaptive::AdaptiveOptions;

/// `GET /search/{query}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub k: Option<usize>,
}

/// `GET /search/adaptive_query/{query}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdaptiveParams {
    pub k: Option<usize>,
    pub rerank_mode: Option<bool>,
    /// `Auto`, `Factual` or `Analytical`; anything else classifies
    pub query_category: Option<String>,
}

impl AdaptiveParams {
    pub fn into_options(self, defaults: AdaptiveOptions) -> AdaptiveOptions {
        AdaptiveOptions {
            k: self.k.unwrap_or(defaults.k),
            rerank: self.rerank_mode.unwrap_or(defaults.rerank),
            category: self
                .query_category
                .as_deref()
                .map(CategorySelector::parse)
                .unwrap_or(defaults.category),
        }
    }
}

/// `GET /search/crag/{query}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CragParams {
    pub k: Option<usize>,
}

/// `GET /search/self_rag/{query}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelfRagParams {
    pub top_k: Option<usize>,
}
