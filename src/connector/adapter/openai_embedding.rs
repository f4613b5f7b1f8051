//! OpenAI-compatible embedding client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::EmbeddingService;
use crate::domain::{DomainError, EmbeddingConfig};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Embeds one text per request against `{base}/embeddings`.
///
/// The API key is optional at construction so the HTTP surface can start
/// without one; every call then fails with a configuration error.
pub struct OpenAiEmbedding {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    config: EmbeddingConfig,
}

impl OpenAiEmbedding {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let model: String = model.into();
        if model.trim().is_empty() {
            return Err(DomainError::configuration("missing OpenAI embedding model name"));
        }
        let client = build_client(timeout)?;
        let base: String = base_url.into();
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base.trim_end_matches('/')),
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            config: EmbeddingConfig::new(model, dimensions),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Shared client builder for OpenAI-compatible endpoints.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, DomainError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| DomainError::configuration(format!("failed to build OpenAI HTTP client: {}", e)))
}

pub(crate) fn bearer(api_key: Option<&str>) -> Result<HeaderValue, DomainError> {
    let key = api_key.ok_or_else(|| DomainError::configuration("missing OpenAI API key"))?;
    HeaderValue::from_str(&format!("Bearer {}", key))
        .map_err(|e| DomainError::configuration(format!("invalid OpenAI API key: {}", e)))
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingService for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let auth = bearer(self.api_key.as_deref())?;
        let request = EmbeddingRequest {
            input: text,
            model: self.config.model_name(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, auth)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::remote(format!("OpenAI embeddings request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(DomainError::remote(format!(
                "OpenAI embeddings request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            DomainError::parse(format!("failed to parse OpenAI embedding response: {}", e))
        })?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .ok_or_else(|| DomainError::parse("OpenAI embedding response contained no data"))?;

        if vector.len() != self.config.dimensions() {
            return Err(DomainError::configuration(format!(
                "model {} returned {} dimensions, expected {}",
                self.config.model_name(),
                vector.len(),
                self.config.dimensions()
            )));
        }

        debug!("Embedded {} chars into {} dimensions", text.len(), vector.len());
        Ok(vector)
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}
