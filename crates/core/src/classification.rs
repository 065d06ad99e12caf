//! Classification and embedding results exchanged with inference backends.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ClassificationError;

/// One label with its independent confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    /// Candidate label (a known question)
    pub label: String,

    /// Confidence score (multi-label, not normalized across labels)
    pub score: f64,
}

impl LabelScore {
    /// Create a new label score.
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Scores returned by a zero-shot classifier, one per requested label.
///
/// No ordering is implied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Per-label scores
    pub scores: Vec<LabelScore>,
}

impl ClassificationResult {
    /// Wrap a list of scores.
    pub fn new(scores: Vec<LabelScore>) -> Self {
        Self { scores }
    }

    /// Number of scored labels.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Check if no labels were scored.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Score for a label, if present.
    pub fn score_of(&self, label: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.score)
    }

    /// Check that every requested label was scored exactly once with a
    /// finite score, and that nothing else was.
    pub fn validate_against(&self, labels: &[String]) -> Result<(), ClassificationError> {
        if self.scores.is_empty() {
            return Err(ClassificationError::InvalidResponse(
                "empty classification result".to_string(),
            ));
        }

        let requested: HashSet<&str> = labels.iter().map(String::as_str).collect();
        let mut seen = HashSet::with_capacity(self.scores.len());

        for s in &self.scores {
            if !requested.contains(s.label.as_str()) {
                return Err(ClassificationError::InvalidResponse(format!(
                    "unexpected label in result: {:?}",
                    s.label
                )));
            }
            if !seen.insert(s.label.as_str()) {
                return Err(ClassificationError::InvalidResponse(format!(
                    "label scored more than once: {:?}",
                    s.label
                )));
            }
            if !s.score.is_finite() {
                return Err(ClassificationError::InvalidResponse(format!(
                    "non-finite score for {:?}",
                    s.label
                )));
            }
        }

        if seen.len() != requested.len() {
            let missing = requested.difference(&seen).count();
            return Err(ClassificationError::InvalidResponse(format!(
                "{} requested label(s) missing from result",
                missing
            )));
        }

        Ok(())
    }
}

/// Fixed-length embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    /// Vector length.
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Borrow the raw values.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}
