//! LLM-backed query classifier

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Category, DomainError, PromptChain, QueryClassifier};

pub const CLASSIFY_PROMPT: &str = "Classify the following query into one of these categories: \
Factual, Analytical.\nQuery: ${var:query}\n\
Respond with a JSON object of the form {\"category\": \"<Factual|Analytical>\"}.";

#[derive(Debug, Deserialize)]
struct CategoryOutput {
    category: String,
}

/// Classifies queries with a structured-output prompt chain
#[derive(Debug)]
pub struct LlmQueryClassifier {
    chain: PromptChain,
}

impl LlmQueryClassifier {
    pub fn new(chain: PromptChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl QueryClassifier for LlmQueryClassifier {
    async fn classify(&self, query: &str) -> Result<Category, DomainError> {
        let output: CategoryOutput = self.chain.invoke_structured(&[("query", query)]).await?;

        let category = Category::parse_label(&output.category).ok_or_else(|| {
            DomainError::contract_violation(self.chain.stage(), output.category.clone())
        })?;

        debug!(category = %category, "Query classified");
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::{ModelSettings, PipelineStage};
    use std::sync::Arc;

    fn classifier(reply: &str) -> LlmQueryClassifier {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(reply));
        LlmQueryClassifier::new(PromptChain::new(
            "classify",
            PipelineStage::Classification,
            CLASSIFY_PROMPT,
            provider,
            ModelSettings::new("m"),
        ))
    }

    #[tokio::test]
    async fn test_classify() {
        let category = classifier(r#"{"category": "Analytical"}"#)
            .classify("Why does praise work?")
            .await
            .unwrap();

        assert_eq!(category, Category::Analytical);
    }

    #[tokio::test]
    async fn test_label_is_normalized() {
        let category = classifier(r#"{"category": " factual "}"#)
            .classify("Who wrote the book?")
            .await
            .unwrap();

        assert_eq!(category, Category::Factual);
    }

    #[tokio::test]
    async fn test_out_of_vocabulary_label_is_fatal() {
        let err = classifier(r#"{"category": "Opinion"}"#)
            .classify("What do you think?")
            .await
            .unwrap_err();

        match err {
            DomainError::ClassificationContractViolation { stage, label } => {
                assert_eq!(stage, PipelineStage::Classification);
                assert_eq!(label, "Opinion");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
