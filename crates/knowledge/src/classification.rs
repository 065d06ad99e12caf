//! Zero-shot classification capability.
//!
//! The resolver only needs one operation: score a text against a set of
//! candidate labels. [`HfZeroShotClient`] provides it over the hosted
//! inference API; tests substitute a deterministic scorer.

use async_trait::async_trait;
use qaroute_core::{ClassificationError, ClassificationResult, ClassifierConfig, LabelScore};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::inference::{InferenceHttp, RequestFailure};

/// Scores a text against candidate labels.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Score `text` against every label.
    ///
    /// With `multi_label` set, each label is scored independently and the
    /// scores need not sum to one.
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
        multi_label: bool,
    ) -> Result<ClassificationResult, ClassificationError>;
}

/// Zero-shot classifier backed by the Hugging Face inference API.
#[derive(Clone)]
pub struct HfZeroShotClient {
    http: InferenceHttp,
}

impl HfZeroShotClient {
    /// Create a client from configuration.
    pub fn new(config: &ClassifierConfig) -> Self {
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

/// The service has answered in two shapes over time.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    /// `[{"label": ..., "score": ...}, ...]`
    Pairs(Vec<LabelScore>),
    /// `{"sequence": ..., "labels": [...], "scores": [...]}`
    Columns { labels: Vec<String>, scores: Vec<f64> },
}

impl ZeroShotResponse {
    fn into_result(self) -> Result<ClassificationResult, ClassificationError> {
        match self {
            Self::Pairs(scores) => Ok(ClassificationResult::new(scores)),
            Self::Columns { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(ClassificationError::InvalidResponse(format!(
                        "{} labels but {} scores",
                        labels.len(),
                        scores.len()
                    )));
                }
                Ok(ClassificationResult::new(
                    labels
                        .into_iter()
                        .zip(scores)
                        .map(|(label, score)| LabelScore { label, score })
                        .collect(),
                ))
            }
        }
    }
}

#[async_trait]
impl ZeroShotClassifier for HfZeroShotClient {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
        multi_label: bool,
    ) -> Result<ClassificationResult, ClassificationError> {
        let payload = json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": labels,
                "multi_label": multi_label,
            }
        });

        debug!("Classifying against {} labels", labels.len());

        let response: ZeroShotResponse = self.http.post(&payload).await.map_err(|failure| {
            warn!("Zero-shot request to {} failed: {:?}", self.http.url(), failure);
            match failure {
                RequestFailure::Timeout => ClassificationError::Timeout(self.http.timeout()),
                RequestFailure::Transport(msg) => ClassificationError::Unavailable(msg),
                RequestFailure::Status(status, body) => ClassificationError::Unavailable(
                    format!("status {}: {}", status, body),
                ),
                RequestFailure::Decode(msg) => ClassificationError::InvalidResponse(msg),
            }
        })?;

        response.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const MODEL: &str = "facebook/bart-large-mnli";

    fn client_for(server: &mockito::ServerGuard, token: Option<&str>) -> HfZeroShotClient {
        HfZeroShotClient::new(&ClassifierConfig {
            endpoint: server.url(),
            model: MODEL.to_string(),
            api_token: token.map(str::to_string),
            timeout_ms: 2_000,
        })
    }

    fn labels() -> Vec<String> {
        vec!["What does EVA do?".to_string(), "How does PHIL work?".to_string()]
    }

    #[test]
    fn test_parse_pairs_response() {
        let raw = r#"[
            {"label": "What does EVA do?", "score": 0.91},
            {"label": "How does PHIL work?", "score": 0.08}
        ]"#;
        let parsed: ZeroShotResponse = serde_json::from_str(raw).unwrap();
        let result = parsed.into_result().unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.score_of("What does EVA do?"), Some(0.91));
    }

    #[test]
    fn test_parse_columns_response() {
        let raw = r#"{
            "sequence": "What does EVA do?",
            "labels": ["What does EVA do?", "How does PHIL work?"],
            "scores": [0.91, 0.08]
        }"#;
        let parsed: ZeroShotResponse = serde_json::from_str(raw).unwrap();
        let result = parsed.into_result().unwrap();

        assert_eq!(result.score_of("How does PHIL work?"), Some(0.08));
    }

    #[test]
    fn test_columns_length_mismatch_is_invalid() {
        let raw = r#"{"labels": ["a", "b"], "scores": [0.5]}"#;
        let parsed: ZeroShotResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            parsed.into_result(),
            Err(ClassificationError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let config = ClassifierConfig {
            // Reserved port on localhost; nothing listens there
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_ms: 2_000,
            ..ClassifierConfig::default()
        };
        let client = HfZeroShotClient::new(&config);

        let result = client
            .classify("What does EVA do?", &["What does EVA do?".to_string()], true)
            .await;

        assert!(matches!(
            result,
            Err(ClassificationError::Unavailable(_)) | Err(ClassificationError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_classify_request_shape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/facebook/bart-large-mnli")
            .match_header("authorization", "Bearer hf_secret")
            .match_body(Matcher::Json(json!({
                "inputs": "Tell me about EVA",
                "parameters": {
                    "candidate_labels": ["What does EVA do?", "How does PHIL work?"],
                    "multi_label": true
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"labels": ["How does PHIL work?", "What does EVA do?"], "scores": [0.12, 0.87]}"#)
            .create_async()
            .await;

        let result = client_for(&server, Some("hf_secret"))
            .classify("Tell me about EVA", &labels(), true)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.score_of("What does EVA do?"), Some(0.87));
        assert_eq!(result.score_of("How does PHIL work?"), Some(0.12));
    }

    #[tokio::test]
    async fn test_scores_keep_full_precision() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/facebook/bart-large-mnli")
            .with_status(200)
            .with_body(r#"[{"label": "Q", "score": 0.50000001}]"#)
            .create_async()
            .await;

        let result = client_for(&server, None)
            .classify("q?", &["Q".to_string()], true)
            .await
            .unwrap();

        let score = result.score_of("Q").unwrap();
        assert!(score > 0.5, "score narrowed to {}", score);
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/facebook/bart-large-mnli")
            .with_status(503)
            .with_body(r#"{"error": "Model is currently loading"}"#)
            .create_async()
            .await;

        let err = client_for(&server, None)
            .classify("What does EVA do?", &labels(), true)
            .await
            .unwrap_err();

        match err {
            ClassificationError::Unavailable(msg) => assert!(msg.contains("503"), "{}", msg),
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/facebook/bart-large-mnli")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let result = client_for(&server, None)
            .classify("What does EVA do?", &labels(), true)
            .await;

        assert!(matches!(result, Err(ClassificationError::InvalidResponse(_))));
    }
}
