//! Knowledge model - curated question/answer pairs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A curated question paired with its pre-written answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    /// Known question text (used verbatim as a classification label)
    pub question: String,

    /// Curated answer
    pub answer: String,
}

impl QaEntry {
    /// Build an entry, returning `None` when either field is empty.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Option<Self> {
        let question = question.into();
        let answer = answer.into();
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self { question, answer })
    }
}

/// Mapping from known question text to curated answer.
///
/// Keys keep the position of their first insertion, so [`labels`](Self::labels)
/// yields questions in source order. Re-inserting a question replaces its
/// answer in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    entries: IndexMap<String, String>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Returns the previous answer if the question was known.
    pub fn insert(&mut self, entry: QaEntry) -> Option<String> {
        self.entries.insert(entry.question, entry.answer)
    }

    /// Known questions in source order.
    pub fn labels(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Exact-match answer lookup.
    pub fn answer_for(&self, question: &str) -> Option<&str> {
        self.entries.get(question).map(String::as_str)
    }

    /// Position of a question in source order.
    pub fn position(&self, question: &str) -> Option<usize> {
        self.entries.get_index_of(question)
    }

    /// Whether the question is known.
    pub fn contains(&self, question: &str) -> bool {
        self.entries.contains_key(question)
    }

    /// Number of known questions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no known questions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(question, answer)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }
}

impl FromIterator<QaEntry> for KnowledgeBase {
    fn from_iter<I: IntoIterator<Item = QaEntry>>(iter: I) -> Self {
        let mut kb = Self::new();
        for entry in iter {
            kb.insert(entry);
        }
        kb
    }
}
