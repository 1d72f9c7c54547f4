//! CRAG decision and result types

use serde::Serialize;

use super::config::{CragAction, CragConfig};
use super::scorer::ScoredDocument;
use crate::domain::knowledge_base::Document;
use crate::domain::web_search::SourceCitation;
use crate::domain::DomainError;

/// Title of the citation that stands for the local corpus
pub const RETRIEVED_DOCUMENT_TITLE: &str = "Retrieved document";

/// Branch decision over a scored document set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CragAssessment {
    pub action: CragAction,
    pub max_score: f32,
    /// Index of the first document reaching `max_score`
    pub best_index: usize,
    pub scores: Vec<f32>,
}

impl CragAssessment {
    /// Decide on the branch from per-document scores.
    ///
    /// An empty set has no maximum and is rejected.
    pub fn assess(config: &CragConfig, scored: &[ScoredDocument]) -> Result<Self, DomainError> {
        let scores: Vec<f32> = scored.iter().map(|s| s.relevance_score).collect();

        if let Some(bad) = scores.iter().find(|s| s.is_nan()) {
            return Err(DomainError::validation(format!(
                "Relevance score is not a number: {bad}"
            )));
        }

        let (best_index, max_score) = scores
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((i, score)),
            })
            .ok_or(DomainError::NoDocumentsRetrieved)?;

        Ok(Self {
            action: config.decide(max_score),
            max_score,
            best_index,
            scores,
        })
    }
}

/// Final CRAG answer with the decision data that produced it
#[derive(Debug, Clone, Serialize)]
pub struct CragAnswer {
    /// Generated answer followed by the rendered citations
    pub text: String,
    pub action: CragAction,
    pub scores: Vec<f32>,
    /// Knowledge handed to generation
    pub knowledge: String,
    pub citations: Vec<SourceCitation>,
}

/// Citation standing for the best retrieved document
pub fn retrieved_citation() -> SourceCitation {
    SourceCitation::new(RETRIEVED_DOCUMENT_TITLE, "")
}

/// Best document of an assessed set
pub fn best_document<'a>(scored: &'a [ScoredDocument], assessment: &CragAssessment) -> Option<&'a Document> {
    scored.get(assessment.best_index).map(|s| &s.document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(scores: &[f32]) -> Vec<ScoredDocument> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| ScoredDocument::new(Document::new(format!("doc-{i}"), format!("c{i}")), *s))
            .collect()
    }

    #[test]
    fn test_assess_picks_max() {
        let docs = scored(&[0.2, 0.9, 0.4]);
        let assessment = CragAssessment::assess(&CragConfig::default(), &docs).unwrap();

        assert_eq!(assessment.action, CragAction::Correct);
        assert_eq!(assessment.max_score, 0.9);
        assert_eq!(assessment.best_index, 1);
        assert_eq!(best_document(&docs, &assessment).unwrap().id, "doc-1");
    }

    #[test]
    fn test_assess_tie_takes_first() {
        let docs = scored(&[0.5, 0.5]);
        let assessment = CragAssessment::assess(&CragConfig::default(), &docs).unwrap();

        assert_eq!(assessment.action, CragAction::Ambiguous);
        assert_eq!(assessment.best_index, 0);
    }

    #[test]
    fn test_assess_empty_set() {
        let err = CragAssessment::assess(&CragConfig::default(), &[]).unwrap_err();
        assert!(matches!(err, DomainError::NoDocumentsRetrieved));
    }

    #[test]
    fn test_assess_rejects_nan() {
        let docs = scored(&[0.1, f32::NAN]);
        let err = CragAssessment::assess(&CragConfig::default(), &docs).unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn test_assess_low_scores() {
        let docs = scored(&[0.1, 0.2]);
        let assessment = CragAssessment::assess(&CragConfig::default(), &docs).unwrap();

        assert_eq!(assessment.action, CragAction::Incorrect);
        assert_eq!(assessment.scores, vec![0.1, 0.2]);
    }

    #[test]
    fn test_retrieved_citation_has_no_link() {
        let citation = retrieved_citation();
        assert_eq!(citation.title, "Retrieved document");
        assert!(citation.link.is_empty());
    }
}
