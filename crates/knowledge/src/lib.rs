//! Knowledge routing service.
//!
//! Loading of curated question/answer pairs, the zero-shot classification
//! and embedding capabilities, and the resolver that decides between a
//! curated answer and a fallback.

#![warn(missing_docs)]

pub mod loader;
pub mod source;
pub mod classification;
pub mod embedding;
pub mod diagnostics;
pub mod resolver;
mod inference;

pub use loader::{load, load_str};
pub use source::{CachedSource, JsonFileSource, KnowledgeSource, StaticSource};
pub use classification::{HfZeroShotClient, ZeroShotClassifier};
pub use embedding::{embed_all, Embedder, HfEmbeddingClient};
pub use diagnostics::{cosine_similarity, euclidean_distance, SimilarityMatrix};
pub use resolver::{select_best, Resolution, Resolver, DEFAULT_TIMEOUT};
