//! Embedding capability for offline similarity inspection.
//!
//! Not used when resolving questions.

use async_trait::async_trait;
use qaroute_core::{Embedding, EmbeddingConfig, EmbeddingError};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::inference::{InferenceHttp, RequestFailure};

/// Maps one text to a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;
}

/// Embed every text with one independent call each, preserving order.
pub async fn embed_all<E>(embedder: &E, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>
where
    E: Embedder + ?Sized,
{
    let mut results = Vec::with_capacity(texts.len());

    for text in texts {
        results.push(embedder.embed(text).await?);
    }

    Ok(results)
}

/// Sentence embedder backed by the Hugging Face feature-extraction API.
#[derive(Clone)]
pub struct HfEmbeddingClient {
    http: InferenceHttp,
}

impl HfEmbeddingClient {
    /// Create a client from configuration.
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            http: InferenceHttp::new(
                &config.endpoint,
                &config.model,
                config.api_token.clone(),
                config.timeout(),
            ),
        }
    }
}

/// Sentence models return one vector; token models return one per token.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureResponse {
    Sentence(Vec<f32>),
    Tokens(Vec<Vec<f32>>),
}

impl FeatureResponse {
    fn into_embedding(self) -> Result<Embedding, EmbeddingError> {
        match self {
            Self::Sentence(values) if !values.is_empty() => Ok(Embedding(values)),
            Self::Sentence(_) => Err(EmbeddingError::InvalidResponse("empty vector".to_string())),
            Self::Tokens(rows) => mean_pool(&rows).map(Embedding),
        }
    }
}

fn mean_pool(rows: &[Vec<f32>]) -> Result<Vec<f32>, EmbeddingError> {
    let dimension = rows.first().map(Vec::len).unwrap_or(0);
    if dimension == 0 {
        return Err(EmbeddingError::InvalidResponse("empty token matrix".to_string()));
    }
    if rows.iter().any(|r| r.len() != dimension) {
        return Err(EmbeddingError::InvalidResponse(
            "ragged token matrix".to_string(),
        ));
    }

    let mut pooled = vec![0.0f32; dimension];
    for row in rows {
        for (acc, v) in pooled.iter_mut().zip(row) {
            *acc += v;
        }
    }
    let n = rows.len() as f32;
    pooled.iter_mut().for_each(|v| *v /= n);
    Ok(pooled)
}

#[async_trait]
impl Embedder for HfEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let payload = json!({ "inputs": text });

        debug!("Generating embedding for text ({} chars)", text.len());

        let response: FeatureResponse = self.http.post(&payload).await.map_err(|failure| {
            warn!("Embedding request to {} failed: {:?}", self.http.url(), failure);
            match failure {
                RequestFailure::Timeout => EmbeddingError::Timeout(self.http.timeout()),
                RequestFailure::Transport(msg) => EmbeddingError::Unavailable(msg),
                RequestFailure::Status(status, body) => {
                    EmbeddingError::Unavailable(format!("status {}: {}", status, body))
                }
                RequestFailure::Decode(msg) => EmbeddingError::InvalidResponse(msg),
            }
        })?;

        response.into_embedding()
    }
}
