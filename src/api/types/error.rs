//! OpenAI-style error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, PipelineStage};

/// Error categories of the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    ServerError,
    UpstreamError,
    TimeoutError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::TimeoutError => write!(f, "timeout_error"),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Pipeline step the failure belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                    stage: None,
                },
            },
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn with_stage(mut self, stage: Option<PipelineStage>) -> Self {
        self.response.error.stage = stage;
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    /// A collaborator failed or answered something unusable
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ApiErrorType::UpstreamError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, ApiErrorType::UpstreamError, message)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, ApiErrorType::TimeoutError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

/// Collaborator payloads (provider messages, raw labels, raw scores) stay in
/// the logs; the body only names the failure kind and stage.
impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let stage = err.stage();
        let api_error = match &err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::UnknownCategory { category } => {
                Self::bad_request(format!("No retrieval strategy for category '{}'", category))
                    .with_param("query_category")
            }
            DomainError::NoDocumentsRetrieved => {
                Self::not_found("No documents retrieved for the query")
            }
            DomainError::Capability { stage, .. } => {
                Self::unavailable(format!("Upstream call failed during {}", stage))
            }
            DomainError::Provider { provider, .. } => {
                Self::unavailable(format!("Upstream provider '{}' failed", provider))
            }
            DomainError::ClassificationContractViolation { stage, .. } => {
                Self::bad_gateway(format!("Unexpected model output during {}", stage))
            }
            DomainError::MalformedUtilityScore { .. } => {
                Self::bad_gateway("Model returned a malformed utility score")
            }
            DomainError::MalformedCitationData { .. } => {
                Self::bad_gateway("Web search returned malformed citation data")
            }
            DomainError::Timeout { stage } => {
                Self::gateway_timeout(format!("Request deadline exceeded before {}", stage))
            }
            DomainError::Configuration { .. } | DomainError::Internal { .. } => {
                Self::internal("Internal server error")
            }
        };

        api_error.with_code(err.kind()).with_stage(stage)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}
