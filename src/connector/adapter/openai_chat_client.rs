use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::openai_embedding::{bearer, build_client};
use crate::application::ChatClient;
use crate::domain::DomainError;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-2024-08-06";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion client (`{base}/chat/completions`).
pub struct OpenAiChatClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let model: String = model.into();
        if model.trim().is_empty() {
            return Err(DomainError::configuration("missing OpenAI chat model name"));
        }
        let base: String = base_url.into();
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: format!("{}/chat/completions", base.trim_end_matches('/')),
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn extract_content(response: ChatResponse) -> Result<String, DomainError> {
    if let Some(error) = response.error {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(DomainError::remote(format!("OpenAI API error: {}", message)));
    }

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| DomainError::remote("no choices returned from OpenAI"))
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let auth = bearer(self.api_key.as_deref())?;
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, auth)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::remote(format!("OpenAI chat request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::remote(format!("failed to read OpenAI chat response: {}", e)))?;

        // Error bodies are still JSON with an `error` object; prefer its message.
        let parsed: ChatResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(DomainError::remote(format!(
                    "OpenAI chat request failed ({}): {}",
                    status, body
                )));
            }
            Err(e) => {
                return Err(DomainError::parse(format!(
                    "failed to parse OpenAI chat response: {}",
                    e
                )));
            }
        };

        if !status.is_success() && parsed.error.is_none() {
            return Err(DomainError::remote(format!(
                "OpenAI chat request failed ({}): {}",
                status, body
            )));
        }

        extract_content(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ChatResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_extract_first_choice() {
        let response = parse(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"[]"}}]}"#,
        );
        assert_eq!(extract_content(response).unwrap(), "[]");
    }

    #[test]
    fn test_error_object_is_remote_error() {
        let response = parse(r#"{"error":{"message":"Invalid API key","type":"auth"}}"#);
        let err = extract_content(response).unwrap_err();
        assert!(err.is_remote());
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn test_no_choices_is_remote_error() {
        let err = extract_content(parse(r#"{"choices":[]}"#)).unwrap_err();
        assert!(err.is_remote());
    }

    #[test]
    fn test_request_is_single_user_message() {
        let request = ChatRequest {
            model: DEFAULT_CHAT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-2024-08-06");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let client = OpenAiChatClient::new(
            None,
            "http://127.0.0.1:9/v1",
            DEFAULT_CHAT_MODEL,
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(client.complete("hi").await.unwrap_err().is_configuration());
    }
}
