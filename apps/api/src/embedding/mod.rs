/// Embedding client: the single entry point for semantic encoding.
///
/// The encoder is an external sidecar service exposing
/// `POST {texts: [...]} -> {embeddings: [[...]]}` over HTTP. Its absence
/// is a supported degraded mode, not an error: the service then ranks on
/// the lexical signal alone.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

const ENCODE_TIMEOUT_SECS: u64 = 60;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("encoder error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("encoder returned {got} vectors for {expected} texts")]
    CountMismatch { expected: usize, got: usize },

    #[error("rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// Text-encoding capability: a batch of texts in, one fixed-dimension
/// dense vector per text out. Implemented by `EmbeddingClient` in
/// production and by in-process stubs in tests.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

#[derive(Debug, Serialize)]
struct EncodeRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EncodeResponse {
    embeddings: Vec<Vec<f32>>,
}

/// HTTP client for the embedding sidecar.
/// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
pub struct EmbeddingClient {
    client: Client,
    endpoint: String,
}

impl EmbeddingClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(ENCODE_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
        }
    }
}

#[async_trait]
impl TextEncoder for EmbeddingClient {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let request_body = EncodeRequest { texts };

        let mut last_error: Option<EmbedError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "encode attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbedError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("encoder returned {}: {}", status, body);
                last_error = Some(EmbedError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmbedError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let parsed: EncodeResponse = response.json().await?;

            if parsed.embeddings.len() != texts.len() {
                return Err(EmbedError::CountMismatch {
                    expected: texts.len(),
                    got: parsed.embeddings.len(),
                });
            }

            debug!("encoded {} texts", texts.len());

            return Ok(parsed.embeddings);
        }

        Err(last_error.unwrap_or(EmbedError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Process-lifetime semantic capability, constructed once at startup and
/// shared read-only by every request. Absence is a typed variant rather
/// than a nullable client.
#[derive(Clone)]
pub enum SemanticModel {
    Available(Arc<dyn TextEncoder>),
    Unavailable,
}

impl SemanticModel {
    pub fn from_config(config: &Config) -> Self {
        match &config.embedding_url {
            Some(url) => Self::Available(Arc::new(EmbeddingClient::new(url.clone()))),
            None => Self::Unavailable,
        }
    }

    pub fn from_encoder(encoder: Arc<dyn TextEncoder>) -> Self {
        Self::Available(encoder)
    }

    pub fn encoder(&self) -> Option<&Arc<dyn TextEncoder>> {
        match self {
            Self::Available(encoder) => Some(encoder),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEncoder;

    #[async_trait]
    impl TextEncoder for FixedEncoder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    #[test]
    fn test_unavailable_has_no_encoder() {
        let model = SemanticModel::Unavailable;
        assert!(!model.is_available());
        assert!(model.encoder().is_none());
    }

    #[test]
    fn test_from_encoder_is_available() {
        let model = SemanticModel::from_encoder(Arc::new(FixedEncoder));
        assert!(model.is_available());
        assert!(model.encoder().is_some());
    }

    #[tokio::test]
    async fn test_stub_encoder_roundtrip() {
        let model = SemanticModel::from_encoder(Arc::new(FixedEncoder));
        let encoder = model.encoder().unwrap();
        let vectors = encoder
            .encode(&["one".to_string(), "two".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![1.0, 0.0]);
    }

    #[test]
    fn test_count_mismatch_message_names_both_sides() {
        let error = EmbedError::CountMismatch {
            expected: 3,
            got: 1,
        };
        assert_eq!(error.to_string(), "encoder returned 1 vectors for 3 texts");
    }
}
