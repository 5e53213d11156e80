//! Raw extraction items as emitted by one model run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One field emission from one model run.
///
/// A run's list is an immutable snapshot; re-running replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionItem {
    /// Label under which the model reported the field.
    #[serde(default)]
    pub source_key: String,
    /// Extracted value as text.
    #[serde(default)]
    pub value: String,
    /// Zero-based indices into the linearized text. Empty means "no known anchor".
    #[serde(default)]
    pub line_numbers: Vec<usize>,
    /// Model confidence, when the run reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ExtractionItem {
    /// Item without a confidence score.
    pub fn new(
        source_key: impl Into<String>,
        value: impl Into<String>,
        line_numbers: impl Into<Vec<usize>>,
    ) -> Self {
        Self {
            source_key: source_key.into(),
            value: value.into(),
            line_numbers: line_numbers.into(),
            confidence: None,
        }
    }

    /// Attach a confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Which of the two compared model runs an item or value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// First model run.
    A,
    /// Second model run.
    B,
}

impl Side {
    /// The opposite run.
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_without_optional_fields() {
        let item: ExtractionItem =
            serde_json::from_str(r#"{"source_key":"Claim Number","value":"123"}"#).unwrap();
        assert_eq!(item.source_key, "Claim Number");
        assert!(item.line_numbers.is_empty());
        assert_eq!(item.confidence, None);
    }

    #[test]
    fn side_other_flips() {
        assert_eq!(Side::A.other(), Side::B);
        assert_eq!(Side::B.other(), Side::A);
    }
}
