//! Knowledge sources.
//!
//! A source hands out the current knowledge base. The resolver asks for it
//! on every call; whether that means a fresh read is up to the source.

use async_trait::async_trait;
use qaroute_core::{KnowledgeBase, KnowledgeError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::loader;

/// Provider of the curated knowledge base.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Load (or return) the current knowledge base.
    async fn load(&self) -> Result<Arc<KnowledgeBase>, KnowledgeError>;
}

/// JSON file source. Reads and parses the file on every `load`.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source for the given file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// File path backing this source.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KnowledgeSource for JsonFileSource {
    async fn load(&self) -> Result<Arc<KnowledgeBase>, KnowledgeError> {
        debug!("Reading knowledge source {}", self.path.display());
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(Arc::new(loader::load_str(&raw)?))
    }
}

/// Fixed, already-built knowledge base.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    kb: Arc<KnowledgeBase>,
}

impl StaticSource {
    /// Wrap a knowledge base.
    pub fn new(kb: KnowledgeBase) -> Self {
        Self { kb: Arc::new(kb) }
    }
}

#[async_trait]
impl KnowledgeSource for StaticSource {
    async fn load(&self) -> Result<Arc<KnowledgeBase>, KnowledgeError> {
        Ok(Arc::clone(&self.kb))
    }
}

/// Loads from an inner source once and serves the cached copy afterwards.
///
/// Failed loads are not cached; the next `load` tries again.
pub struct CachedSource<S> {
    inner: S,
    cache: RwLock<Option<Arc<KnowledgeBase>>>,
}

impl<S: KnowledgeSource> CachedSource<S> {
    /// Wrap a source.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(None),
        }
    }

    /// Drop the cached copy; the next `load` reads the inner source.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Re-read the inner source now and replace the cached copy.
    ///
    /// On failure the previous copy stays in place.
    pub async fn reload(&self) -> Result<Arc<KnowledgeBase>, KnowledgeError> {
        let kb = self.inner.load().await?;
        *self.cache.write().await = Some(Arc::clone(&kb));
        info!("Reloaded knowledge base ({} questions)", kb.len());
        Ok(kb)
    }

    /// Whether a copy is currently cached.
    pub async fn is_cached(&self) -> bool {
        self.cache.read().await.is_some()
    }
}

#[async_trait]
impl<S: KnowledgeSource> KnowledgeSource for CachedSource<S> {
    async fn load(&self) -> Result<Arc<KnowledgeBase>, KnowledgeError> {
        if let Some(kb) = self.cache.read().await.as_ref() {
            return Ok(Arc::clone(kb));
        }

        let mut cache = self.cache.write().await;
        // Another caller may have filled it while we waited
        if let Some(kb) = cache.as_ref() {
            return Ok(Arc::clone(kb));
        }

        let kb = self.inner.load().await?;
        *cache = Some(Arc::clone(&kb));
        debug!("Cached knowledge base ({} questions)", kb.len());
        Ok(kb)
    }
}
