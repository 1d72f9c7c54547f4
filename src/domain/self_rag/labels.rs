//! Labels produced by the Self-RAG critique steps

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::PipelineStage;
use crate::domain::DomainError;

/// Generation context used when the necessity check answers "no"
pub const NO_RETRIEVAL_NECESSARY: &str = "No retrieval necessary.";

/// Generation context used when no retrieved document is relevant
pub const NO_RELEVANT_CONTEXT: &str = "No relevant context found.";

fn normalize(label: &str) -> String {
    label.trim().trim_end_matches('.').trim().to_lowercase()
}

/// Answer of the retrieval-necessity check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalDecision {
    Retrieve,
    Skip,
}

impl RetrievalDecision {
    /// Parse a yes/no answer (case-insensitive, trimmed)
    pub fn parse(label: &str) -> Result<Self, DomainError> {
        match normalize(label).as_str() {
            "yes" => Ok(Self::Retrieve),
            "no" => Ok(Self::Skip),
            _ => Err(DomainError::contract_violation(PipelineStage::Classification, label)),
        }
    }
}

/// Relevance of one retrieved context to the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    Relevant,
    Irrelevant,
}

impl Relevance {
    pub fn parse(label: &str) -> Result<Self, DomainError> {
        match normalize(label).as_str() {
            "relevant" => Ok(Self::Relevant),
            "irrelevant" => Ok(Self::Irrelevant),
            _ => Err(DomainError::contract_violation(PipelineStage::Scoring, label)),
        }
    }
}

/// How well a candidate is supported by its context. Ordered weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SupportLevel {
    #[serde(rename = "No support")]
    NoSupport,
    #[serde(rename = "Partially supported")]
    PartiallySupported,
    #[serde(rename = "Fully supported")]
    FullySupported,
}

impl SupportLevel {
    pub fn parse(label: &str) -> Result<Self, DomainError> {
        match normalize(label).as_str() {
            "fully supported" => Ok(Self::FullySupported),
            "partially supported" => Ok(Self::PartiallySupported),
            "no support" => Ok(Self::NoSupport),
            _ => Err(DomainError::contract_violation(PipelineStage::Scoring, label)),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::FullySupported)
    }
}

/// Parse a utility rating: an integer from 1 to 5, given as a JSON number
/// or as a string holding one. Anything else is `MalformedUtilityScore`.
pub fn parse_utility(value: &Value) -> Result<u8, DomainError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed
        .filter(|n| (1..=5).contains(n))
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| DomainError::malformed_utility(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retrieval_decision() {
        assert_eq!(RetrievalDecision::parse(" Yes ").unwrap(), RetrievalDecision::Retrieve);
        assert_eq!(RetrievalDecision::parse("NO").unwrap(), RetrievalDecision::Skip);
        assert_eq!(RetrievalDecision::parse("No.").unwrap(), RetrievalDecision::Skip);
        assert!(matches!(
            RetrievalDecision::parse("maybe"),
            Err(DomainError::ClassificationContractViolation { .. })
        ));
    }

    #[test]
    fn test_relevance() {
        assert_eq!(Relevance::parse("Relevant").unwrap(), Relevance::Relevant);
        assert_eq!(Relevance::parse("irrelevant\n").unwrap(), Relevance::Irrelevant);
        assert!(Relevance::parse("somewhat").is_err());
    }

    #[test]
    fn test_support_order() {
        assert!(SupportLevel::FullySupported > SupportLevel::PartiallySupported);
        assert!(SupportLevel::PartiallySupported > SupportLevel::NoSupport);
        assert_eq!(
            SupportLevel::parse("Fully supported").unwrap(),
            SupportLevel::FullySupported
        );
        assert_eq!(SupportLevel::parse("no support").unwrap(), SupportLevel::NoSupport);
    }

    #[test]
    fn test_support_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&SupportLevel::PartiallySupported).unwrap(),
            r#""Partially supported""#
        );
    }

    #[test]
    fn test_parse_utility() {
        assert_eq!(parse_utility(&json!(4)).unwrap(), 4);
        assert_eq!(parse_utility(&json!(" 5 ")).unwrap(), 5);
    }

    #[test]
    fn test_parse_utility_malformed() {
        for value in [json!(4.5), json!("four"), json!(0), json!(6), json!(null), json!([3])] {
            assert!(
                matches!(parse_utility(&value), Err(DomainError::MalformedUtilityScore { .. })),
                "{value} should be rejected"
            );
        }
    }
}
