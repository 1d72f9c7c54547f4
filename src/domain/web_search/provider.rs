//! Web search provider trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// External search returning provider-formatted raw text (normally a JSON
/// array of `{title, link, snippet}` records)
#[async_trait]
pub trait WebSearchProvider: Send + Sync + Debug {
    async fn search(&self, query: &str) -> Result<String, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock web search returning a fixed raw payload
    #[derive(Debug)]
    pub struct MockWebSearchProvider {
        response: Result<String, String>,
        queries: Mutex<Vec<String>>,
    }

    impl MockWebSearchProvider {
        pub fn new(raw: impl Into<String>) -> Self {
            Self {
                response: Ok(raw.into()),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: impl Into<String>) -> Self {
            Self {
                response: Err(error.into()),
                queries: Mutex::new(Vec::new()),
            }
        }

        /// Queries searched so far
        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WebSearchProvider for MockWebSearchProvider {
        async fn search(&self, query: &str) -> Result<String, DomainError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.response
                .clone()
                .map_err(|e| DomainError::provider("mock_search", e))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
