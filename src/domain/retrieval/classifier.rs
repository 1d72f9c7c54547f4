//! Query classifier trait

use async_trait::async_trait;

use super::Category;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Maps a query to exactly one category of the closed set.
///
/// An answer outside the set is a `ClassificationContractViolation`, never
/// coerced to a default.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QueryClassifier: Send + Sync {
    async fn classify(&self, query: &str) -> Result<Category, DomainError>;
}
