//! AI gateway client for chat completions.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Failures talking to the completion service.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("AI gateway API key not configured")]
    MissingApiKey,
    #[error("AI gateway rate limit exceeded")]
    RateLimited,
    #[error("AI gateway requires payment")]
    PaymentRequired,
    #[error("AI gateway returned error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("AI gateway response contained no content")]
    EmptyContent,
    #[error("Failed to send request to AI gateway: {0}")]
    Transport(String),
    #[error("Failed to parse AI gateway response: {0}")]
    Decode(String),
}

/// Chat-completion collaborator.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the ordered messages and return the first choice's content.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

/// Completion client for an OpenAI-compatible gateway.
pub struct GatewayCompletionClient {
    client: Client,
    api_key: Option<String>,
    url: String,
    model: String,
}

impl GatewayCompletionClient {
    pub fn new(api_key: Option<String>, url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            url: url.into(),
            model: model.into(),
        }
    }

    /// Configure from `AI_GATEWAY_API_KEY`, `AI_GATEWAY_URL` and `AI_MODEL`.
    ///
    /// A missing key is not fatal here; each request then fails with
    /// [`CompletionError::MissingApiKey`].
    pub fn from_env() -> Self {
        let api_key = env::var("AI_GATEWAY_API_KEY").ok();
        let url = env::var("AI_GATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
        let model = env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        if api_key.is_none() {
            warn!("AI_GATEWAY_API_KEY not configured; diagram generation will fail");
        }

        Self::new(api_key, url, model)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl CompletionClient for GatewayCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_ref().ok_or(CompletionError::MissingApiKey)?;

        let request_body = json!({
            "model": self.model,
            "messages": messages,
        });

        debug!(model = %self.model, url = %self.url, "Sending completion request");

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("AI gateway error {}: {}", status, error_text);
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                CompletionError::RateLimited
            } else if status == StatusCode::PAYMENT_REQUIRED {
                CompletionError::PaymentRequired
            } else {
                CompletionError::Status {
                    status: status.as_u16(),
                    body: error_text,
                }
            });
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        first_choice_content(&response_json)
    }
}

/// `choices[0].message.content`, rejecting missing or blank content.
pub fn first_choice_content(response: &serde_json::Value) -> Result<String, CompletionError> {
    response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .filter(|content| !content.trim().is_empty())
        .map(str::to_string)
        .ok_or(CompletionError::EmptyContent)
}
