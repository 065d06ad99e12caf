//! qaroute core data models.
//!
//! This crate defines the curated knowledge base, the classification
//! results exchanged with inference backends, configuration, and the
//! error taxonomy shared by the router.

#![warn(missing_docs)]

// Knowledge
mod knowledge;

// Inference results
mod classification;

// Configuration and errors
mod config;
mod error;

// Re-exports
pub use knowledge::{KnowledgeBase, QaEntry};
pub use classification::{ClassificationResult, Embedding, LabelScore};
pub use config::{
    ClassifierConfig, EmbeddingConfig, RouterConfig, DEFAULT_CUTOFF, DEFAULT_TIMEOUT_MS,
};
pub use error::{
    ClassificationError, ConfigError, EmbeddingError, KnowledgeError, ResolveError,
};

/// Outcome of one resolution: the curated answer, or `None` to fall back.
pub type ResolvedAnswer = Option<String>;
