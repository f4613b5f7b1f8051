use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::application::{ChatClient, EmbeddingService};
use crate::domain::{DomainError, EmbeddingConfig};

/// Capped exponential backoff. Only remote-service failures are retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(500),
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn backoff(&self, attempt: usize) -> Duration {
        let capped = attempt.min(5) as u32;
        self.base_delay * (1 << capped)
    }

    pub async fn run<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, DomainError>>,
    {
        let mut attempt = 0usize;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_remote() && attempt + 1 < self.max_attempts => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        what, attempt, self.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

pub struct RetryingEmbedding {
    inner: Arc<dyn EmbeddingService>,
    policy: RetryPolicy,
}

impl RetryingEmbedding {
    pub fn new(inner: Arc<dyn EmbeddingService>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl EmbeddingService for RetryingEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.policy.run("embedding", move || self.inner.embed(text)).await
    }

    fn config(&self) -> &EmbeddingConfig {
        self.inner.config()
    }
}

pub struct RetryingChatClient {
    inner: Arc<dyn ChatClient>,
    policy: RetryPolicy,
}

impl RetryingChatClient {
    pub fn new(inner: Arc<dyn ChatClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl ChatClient for RetryingChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.policy.run("chat completion", move || self.inner.complete(prompt)).await
    }
}
