use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Step of a RAG request at which an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Routing,
    Classification,
    Retrieval,
    Reranking,
    Scoring,
    Refinement,
    WebSearch,
    Generation,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routing => "routing",
            Self::Classification => "classification",
            Self::Retrieval => "retrieval",
            Self::Reranking => "reranking",
            Self::Scoring => "scoring",
            Self::Refinement => "refinement",
            Self::WebSearch => "web_search",
            Self::Generation => "generation",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// An external call failed; `stage` names the step it belonged to
    #[error("{stage} failed: {source}")]
    Capability {
        stage: PipelineStage,
        #[source]
        source: Box<DomainError>,
    },

    /// A collaborator answered outside of the agreed vocabulary
    #[error("Unexpected {stage} label: {label:?}")]
    ClassificationContractViolation { stage: PipelineStage, label: String },

    #[error("No retrieval strategy registered for category '{category}'")]
    UnknownCategory { category: String },

    #[error("No documents retrieved")]
    NoDocumentsRetrieved,

    #[error("Malformed citation data: {message}")]
    MalformedCitationData { message: String },

    #[error("Malformed utility score: {value:?}")]
    MalformedUtilityScore { value: String },

    #[error("Deadline exceeded before {stage}")]
    Timeout { stage: PipelineStage },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Attach a pipeline stage to a failed external call.
    ///
    /// Errors that already carry a stage are returned untouched.
    pub fn capability(stage: PipelineStage, source: DomainError) -> Self {
        match source {
            Self::Capability { .. }
            | Self::ClassificationContractViolation { .. }
            | Self::Timeout { .. } => source,
            other => Self::Capability {
                stage,
                source: Box::new(other),
            },
        }
    }

    pub fn contract_violation(stage: PipelineStage, label: impl Into<String>) -> Self {
        Self::ClassificationContractViolation {
            stage,
            label: label.into(),
        }
    }

    pub fn unknown_category(category: impl Into<String>) -> Self {
        Self::UnknownCategory {
            category: category.into(),
        }
    }

    pub fn malformed_citations(message: impl Into<String>) -> Self {
        Self::MalformedCitationData {
            message: message.into(),
        }
    }

    pub fn malformed_utility(value: impl Into<String>) -> Self {
        Self::MalformedUtilityScore {
            value: value.into(),
        }
    }

    /// Stage the error is attributed to, if any
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Capability { stage, .. }
            | Self::ClassificationContractViolation { stage, .. }
            | Self::Timeout { stage } => Some(*stage),
            Self::NoDocumentsRetrieved => Some(PipelineStage::Retrieval),
            Self::MalformedUtilityScore { .. } => Some(PipelineStage::Scoring),
            Self::MalformedCitationData { .. } => Some(PipelineStage::WebSearch),
            Self::UnknownCategory { .. } => Some(PipelineStage::Classification),
            _ => None,
        }
    }

    /// Short machine-readable kind, used for metrics labels and API error codes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Provider { .. } => "provider",
            Self::Configuration { .. } => "configuration",
            Self::Internal { .. } => "internal",
            Self::Capability { .. } => "capability",
            Self::ClassificationContractViolation { .. } => "classification_contract_violation",
            Self::UnknownCategory { .. } => "unknown_category",
            Self::NoDocumentsRetrieved => "no_documents_retrieved",
            Self::MalformedCitationData { .. } => "malformed_citation_data",
            Self::MalformedUtilityScore { .. } => "malformed_utility_score",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Extension to tag failed external calls with their stage
pub trait StageExt<T> {
    fn at_stage(self, stage: PipelineStage) -> Result<T, DomainError>;
}

impl<T> StageExt<T> for Result<T, DomainError> {
    fn at_stage(self, stage: PipelineStage) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::capability(stage, e))
    }
}
