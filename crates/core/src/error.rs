//! Error types shared across qaroute crates.

use std::time::Duration;

/// Errors raised while loading a knowledge source.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    /// The document does not follow the `{"questions": [...]}` contract
    #[error("malformed knowledge source: {0}")]
    MalformedSource(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a zero-shot classification backend.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    /// Backend unreachable or returned an error status
    #[error("classification unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with output that does not cover the requested labels
    #[error("invalid classification response: {0}")]
    InvalidResponse(String),

    /// Backend did not answer in time
    #[error("classification timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors raised by an embedding backend.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Backend unreachable or returned an error status
    #[error("embedding unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with something that is not a vector
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    /// Backend did not answer in time
    #[error("embedding timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors surfaced by the resolver.
///
/// A question with no confident match is not an error; see `Resolver::resolve`.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Question was empty or whitespace
    #[error("question must not be empty")]
    EmptyQuestion,

    /// Knowledge base could not be loaded
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    /// Classification failed or returned unusable output
    #[error(transparent)]
    Classification(ClassificationError),

    /// Classification exceeded the configured timeout
    #[error("classification timed out after {0:?}")]
    Timeout(Duration),

    /// Winning label is missing from the knowledge base it was drawn from
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl From<ClassificationError> for ResolveError {
    fn from(err: ClassificationError) -> Self {
        match err {
            ClassificationError::Timeout(after) => Self::Timeout(after),
            other => Self::Classification(other),
        }
    }
}

impl ResolveError {
    /// Whether the classification backend is at fault (unreachable,
    /// malformed output, or too slow).
    pub fn is_classification_failure(&self) -> bool {
        matches!(self, Self::Classification(_) | Self::Timeout(_))
    }
}

/// Errors raised while reading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A field holds an unusable value
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_distinct_kind() {
        let err: ResolveError = ClassificationError::Timeout(Duration::from_millis(10)).into();
        assert!(matches!(err, ResolveError::Timeout(_)));
        assert!(err.is_classification_failure());

        let err: ResolveError = ClassificationError::Unavailable("down".into()).into();
        assert!(matches!(err, ResolveError::Classification(_)));
    }
}
