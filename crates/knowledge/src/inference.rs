//! Shared HTTP plumbing for the hosted inference API.

use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Why an inference request failed, before it is mapped onto a
/// capability-specific error.
#[derive(Debug)]
pub(crate) enum RequestFailure {
    /// No response within the client timeout
    Timeout,
    /// Connection or protocol failure
    Transport(String),
    /// Non-success status with the response body
    Status(StatusCode, String),
    /// Body was not the expected JSON shape
    Decode(String),
}

/// Client bound to one model on an inference endpoint.
#[derive(Clone)]
pub(crate) struct InferenceHttp {
    client: Client,
    url: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl InferenceHttp {
    pub(crate) fn new(
        endpoint: &str,
        model: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url: format!("{}/models/{}", endpoint.trim_end_matches('/'), model),
            api_token,
            timeout,
        }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST a JSON payload and decode the JSON response.
    pub(crate) async fn post<B, R>(&self, payload: &B) -> Result<R, RequestFailure>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut req = self.client.post(&self.url).json(payload);

        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                RequestFailure::Timeout
            } else {
                RequestFailure::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RequestFailure::Status(status, error_text));
        }

        debug!("Inference API {} answered {}", self.url, status);

        response.json::<R>().await.map_err(|e| {
            if e.is_timeout() {
                RequestFailure::Timeout
            } else {
                RequestFailure::Decode(e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_url() {
        let http = InferenceHttp::new(
            "https://api-inference.huggingface.co/",
            "facebook/bart-large-mnli",
            None,
            Duration::from_secs(1),
        );
        assert_eq!(
            http.url(),
            "https://api-inference.huggingface.co/models/facebook/bart-large-mnli"
        );
        assert_eq!(http.timeout(), Duration::from_secs(1));
    }
}
