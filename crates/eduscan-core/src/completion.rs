//! The structured-completion capability and its OpenRouter-backed client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::CompletionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One turn handed to the completion service.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A single-turn completion returning the reply's content text.
///
/// When `json_object` is set the service is directed to constrain the reply
/// to a JSON object; the direction reduces parse failures but does not
/// guarantee well-formed output, so callers still parse defensively.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        json_object: bool,
    ) -> Result<String, CompletionError>;
}

/// OpenRouter chat-completions client. One attempt per call, no retry,
/// bounded by the configured request timeout.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model_id: String,
    request_timeout: Duration,
}

impl OpenRouterClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            request_timeout: config.request_timeout,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        json_object: bool,
    ) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: &self.model_id,
            messages,
            response_format: json_object.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CompletionError::Api { status, body });
        }

        let reply: CompletionResponse = serde_json::from_str(&body)?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyReply)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}
