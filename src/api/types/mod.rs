//! API request and response types

pub mod error;
pub mod query;
pub mod search;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use query::Query;
pub use search::{AdaptiveParams, CragParams, SearchParams, SelfRagParams};
