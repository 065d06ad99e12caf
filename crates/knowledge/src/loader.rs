//! Knowledge base loading from `{"questions": [...]}` documents.

use qaroute_core::{KnowledgeBase, KnowledgeError, QaEntry};
use serde_json::Value;
use tracing::debug;

/// Top-level key holding the curated entries.
pub const QUESTIONS_KEY: &str = "questions";

/// Build a knowledge base from a parsed document.
///
/// Entries without a non-empty `question` and `answer` string are skipped.
/// A later entry with the same question replaces the earlier answer.
pub fn load(document: &Value) -> Result<KnowledgeBase, KnowledgeError> {
    let root = document.as_object().ok_or_else(|| {
        KnowledgeError::MalformedSource("document root must be an object".to_string())
    })?;

    let items = root.get(QUESTIONS_KEY).ok_or_else(|| {
        KnowledgeError::MalformedSource(format!("`{}` key is expected but missing", QUESTIONS_KEY))
    })?;

    let items = items.as_array().ok_or_else(|| {
        KnowledgeError::MalformedSource(format!("`{}` must be an array", QUESTIONS_KEY))
    })?;

    let mut kb = KnowledgeBase::new();
    let mut skipped = 0usize;

    for item in items {
        match parse_entry(item) {
            Some(entry) => {
                kb.insert(entry);
            }
            None => skipped += 1,
        }
    }

    debug!(
        "Loaded {} curated questions ({} entries skipped)",
        kb.len(),
        skipped
    );

    Ok(kb)
}

/// Parse and load a JSON string.
pub fn load_str(raw: &str) -> Result<KnowledgeBase, KnowledgeError> {
    let document: Value = serde_json::from_str(raw)?;
    load(&document)
}

fn parse_entry(item: &Value) -> Option<QaEntry> {
    let question = item.get("question")?.as_str()?;
    let answer = item.get("answer")?.as_str()?;
    QaEntry::new(question, answer)
}
