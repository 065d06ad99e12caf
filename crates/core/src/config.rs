//! Router configuration.
//!
//! Every field has a default so a partial JSON file (or none at all) is
//! enough. Environment variables are applied with [`RouterConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Default minimum (exclusive) score for trusting a curated answer.
pub const DEFAULT_CUTOFF: f64 = 0.5;

/// Default bound on one inference request, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Configuration for the question router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Path to the JSON file holding the curated questions
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: PathBuf,

    /// Minimum classification score required to use a curated answer
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,

    /// Load the knowledge base once instead of on every resolution
    #[serde(default)]
    pub cache_knowledge: bool,

    /// Zero-shot classifier settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Embedding settings (diagnostics only)
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Zero-shot classification backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Inference API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_classifier_model")]
    pub model: String,

    /// Bearer token
    #[serde(default)]
    pub api_token: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Embedding backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Inference API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Bearer token
    #[serde(default)]
    pub api_token: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("predefined.json")
}

fn default_cutoff() -> f64 {
    DEFAULT_CUTOFF
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_classifier_model() -> String {
    "facebook/bart-large-mnli".to_string()
}

fn default_embedding_model() -> String {
    "efederici/sentence-bert-base".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            knowledge_path: default_knowledge_path(),
            cutoff: default_cutoff(),
            cache_knowledge: false,
            classifier: ClassifierConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_classifier_model(),
            api_token: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_embedding_model(),
            api_token: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClassifierConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl EmbeddingConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl RouterConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply environment variable overrides.
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("QAROUTE_KNOWLEDGE_PATH") {
            self.knowledge_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("QAROUTE_CUTOFF") {
            if let Ok(cutoff) = val.parse() {
                self.cutoff = cutoff;
            }
        }

        if let Ok(val) = std::env::var("QAROUTE_CACHE_KNOWLEDGE") {
            self.cache_knowledge = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("QAROUTE_INFERENCE_URL") {
            self.classifier.endpoint = val.clone();
            self.embedding.endpoint = val;
        }

        if let Ok(val) = std::env::var("QAROUTE_CLASSIFIER_MODEL") {
            self.classifier.model = val;
        }

        if let Ok(val) = std::env::var("QAROUTE_EMBEDDING_MODEL") {
            self.embedding.model = val;
        }

        if let Ok(val) = std::env::var("QAROUTE_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.classifier.timeout_ms = ms;
                self.embedding.timeout_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("HF_TOKEN") {
            self.classifier.api_token = Some(val.clone());
            self.embedding.api_token = Some(val);
        }

        self
    }

    /// Reject values the router cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cutoff.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "cutoff must be a finite number, got {}",
                self.cutoff
            )));
        }
        if self.classifier.timeout_ms == 0 || self.embedding.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}
