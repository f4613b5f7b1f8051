use async_trait::async_trait;

use crate::domain::DomainError;

/// An interface for sending a prompt to a completion model and receiving text.
///
/// Implementors encapsulate transport, serialization, and vendor-specific API
/// details. The returned text is untrusted and must be validated by the caller.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send `prompt` as a single user turn and return the assistant's reply.
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}
