use serde::Deserialize;
use tracing::debug;

use crate::domain::{DomainError, PromptChain};

pub const ROUTING_PROMPT: &str = "You are a helpful assistant to check if the question is \
related to ${var:topic}.\n\nThe question: ${var:question}\n\
Respond with a JSON object of the form {\"check\": true} or {\"check\": false}.";

#[derive(Debug, Deserialize)]
struct RelationCheck {
    check: bool,
}

/// Decides whether a question belongs to the corpus topic
#[derive(Debug)]
pub struct TopicRouter {
    chain: PromptChain,
    topic: String,
}

impl TopicRouter {
    pub fn new(chain: PromptChain, topic: impl Into<String>) -> Self {
        Self {
            chain,
            topic: topic.into(),
        }
    }

    pub async fn is_relevant(&self, question: &str) -> Result<bool, DomainError> {
        let output: RelationCheck = self
            .chain
            .invoke_structured(&[("topic", &self.topic), ("question", question)])
            .await?;

        debug!(relevant = output.check, "Question routed");
        Ok(output.check)
    }
}
