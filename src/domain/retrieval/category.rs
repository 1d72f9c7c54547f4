//! Query categories

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of query categories a retrieval strategy is chosen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Factual,
    Analytical,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Factual, Category::Analytical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Factual => "Factual",
            Self::Analytical => "Analytical",
        }
    }

    /// Match a label case-insensitively, ignoring surrounding whitespace
    pub fn parse_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_label(s).ok_or_else(|| format!("Unknown category: {s}"))
    }
}

/// Category requested by the caller: a fixed category or runtime classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySelector {
    #[default]
    Auto,
    Fixed(Category),
}

impl CategorySelector {
    /// Parse a caller-supplied selector. Anything that is not a known
    /// category, including "Auto", selects runtime classification.
    pub fn parse(value: &str) -> Self {
        Category::parse_label(value)
            .map(Self::Fixed)
            .unwrap_or(Self::Auto)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Fixed(category) => category.as_str(),
        }
    }
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CategorySelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CategorySelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}
