//! Self-RAG candidates and selection

use serde::Serialize;

use super::SupportLevel;

/// One generated answer with its critique, created per relevant context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub text: String,
    /// Position of the context among the relevant contexts
    pub context_index: usize,
    pub support: SupportLevel,
    pub utility: u8,
}

impl Candidate {
    fn rank_key(&self) -> (bool, u8) {
        (self.support.is_full(), self.utility)
    }
}

/// Pick the candidate maximising `(fully supported, utility)`.
///
/// Any fully supported candidate beats every other one; otherwise utility
/// decides. Ties go to the earliest candidate.
pub fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(top) if top.rank_key() >= candidate.rank_key() => Some(top),
        _ => Some(candidate),
    })
}

/// Which terminal state a Self-RAG run ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfRagPath {
    /// Necessity check said no; answered without retrieval
    NoRetrieval,
    /// Nothing retrieved was relevant; answered without context
    NoRelevantContext,
    /// Best of the per-context candidates
    Candidates,
}

impl SelfRagPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRetrieval => "no_retrieval",
            Self::NoRelevantContext => "no_relevant_context",
            Self::Candidates => "candidates",
        }
    }
}

/// Self-RAG result; support and utility are present on the candidates path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfRagAnswer {
    pub text: String,
    pub path: SelfRagPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<SupportLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utility: Option<u8>,
    pub retrieved: usize,
    pub relevant: usize,
    /// Candidates dropped because scoring them failed
    pub excluded: usize,
}

impl SelfRagAnswer {
    /// Answer produced without candidates
    pub fn direct(text: String, path: SelfRagPath, retrieved: usize) -> Self {
        Self {
            text,
            path,
            support: None,
            utility: None,
            retrieved,
            relevant: 0,
            excluded: 0,
        }
    }
}
