//! CRAG configuration types

use serde::{Deserialize, Serialize};

/// Branch taken by the CRAG pipeline for one query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CragAction {
    /// Best retrieved document is used verbatim
    Correct,
    /// Refined best document is combined with web knowledge
    Ambiguous,
    /// Retrieved documents are discarded in favour of web knowledge
    Incorrect,
}

impl CragAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Ambiguous => "ambiguous",
            Self::Incorrect => "incorrect",
        }
    }

    /// Whether this branch consults the web search provider
    pub fn needs_web_search(&self) -> bool {
        !matches!(self, Self::Correct)
    }
}

/// Configuration for CRAG evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CragConfig {
    /// Scores strictly above this select the correct branch
    #[serde(default = "default_correct_threshold")]
    pub correct_threshold: f32,
    /// Scores strictly below this select the incorrect branch
    #[serde(default = "default_incorrect_threshold")]
    pub incorrect_threshold: f32,
    /// Documents retrieved per query
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_correct_threshold() -> f32 {
    0.7
}

fn default_incorrect_threshold() -> f32 {
    0.3
}

fn default_k() -> usize {
    5
}

impl Default for CragConfig {
    fn default() -> Self {
        Self {
            correct_threshold: default_correct_threshold(),
            incorrect_threshold: default_incorrect_threshold(),
            k: default_k(),
        }
    }
}

impl CragConfig {
    /// Create a new CRAG configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the correct threshold
    pub fn with_correct_threshold(mut self, threshold: f32) -> Self {
        self.correct_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the incorrect threshold
    pub fn with_incorrect_threshold(mut self, threshold: f32) -> Self {
        self.incorrect_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Pick the branch for the best document score.
    ///
    /// Both comparisons are strict: a score equal to a threshold is ambiguous.
    pub fn decide(&self, max_score: f32) -> CragAction {
        if max_score > self.correct_threshold {
            CragAction::Correct
        } else if max_score < self.incorrect_threshold {
            CragAction::Incorrect
        } else {
            CragAction::Ambiguous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CragConfig::default();

        assert_eq!(config.correct_threshold, 0.7);
        assert_eq!(config.incorrect_threshold, 0.3);
        assert_eq!(config.k, 5);
    }

    #[test]
    fn test_decide() {
        let config = CragConfig::default();

        assert_eq!(config.decide(0.95), CragAction::Correct);
        assert_eq!(config.decide(0.71), CragAction::Correct);
        assert_eq!(config.decide(0.5), CragAction::Ambiguous);
        assert_eq!(config.decide(0.29), CragAction::Incorrect);
        assert_eq!(config.decide(0.0), CragAction::Incorrect);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let config = CragConfig::default();

        assert_eq!(config.decide(0.7), CragAction::Ambiguous);
        assert_eq!(config.decide(0.3), CragAction::Ambiguous);
    }

    #[test]
    fn test_threshold_clamping() {
        let config = CragConfig::new()
            .with_correct_threshold(1.5)
            .with_incorrect_threshold(-0.5);

        assert_eq!(config.correct_threshold, 1.0);
        assert_eq!(config.incorrect_threshold, 0.0);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: CragConfig = serde_json::from_str(r#"{"k": 3}"#).unwrap();

        assert_eq!(config.k, 3);
        assert_eq!(config.correct_threshold, 0.7);
    }

    #[test]
    fn test_action_web_search() {
        assert!(!CragAction::Correct.needs_web_search());
        assert!(CragAction::Ambiguous.needs_web_search());
        assert!(CragAction::Incorrect.needs_web_search());
    }
}
