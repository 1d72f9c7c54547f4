//! Per-request deadline checked between pipeline steps

use std::time::{Duration, Instant};

use super::error::{DomainError, PipelineStage};

/// Point in time after which no further pipeline step may start.
///
/// A running step is never interrupted; the check happens before each step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires
    pub fn none() -> Self {
        Self { expires_at: None }
    }

    /// A deadline `timeout` from now; one too far out to represent never expires
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(timeout),
        }
    }

    /// Build from an optional timeout in seconds (as found in configuration)
    pub fn from_secs(timeout_secs: Option<u64>) -> Self {
        match timeout_secs {
            Some(secs) => Self::after(Duration::from_secs(secs)),
            None => Self::none(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() >= at)
            .unwrap_or(false)
    }

    /// Fail with `Timeout` if the deadline passed before `next` could start
    pub fn check(&self, next: PipelineStage) -> Result<(), DomainError> {
        if self.is_expired() {
            tracing::warn!(stage = %next, "Request deadline exceeded");
            return Err(DomainError::Timeout { stage: next });
        }
        Ok(())
    }
}
