//! Diagram generation: prompt in, sanitized Mermaid out.

use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::{DiagramStyle, Template};

use super::ai_service::{ChatMessage, CompletionClient, CompletionError};
use super::prompt_compiler::PromptCompiler;
use super::quota_service::{QuotaGate, QuotaPolicy};
use super::sanitizer::sanitize_diagram;

/// Classified generation failure. Each variant maps to one HTTP status.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),
    #[error("Rate limit exceeded: at most {max_requests} diagrams per {window_minutes} minutes")]
    RateLimited {
        max_requests: u32,
        window_minutes: u32,
    },
    #[error("AI service not configured")]
    UpstreamConfig,
    #[error("AI service rate limited")]
    UpstreamRateLimited,
    #[error("AI service payment required")]
    UpstreamPaymentRequired,
    #[error("AI service error: {0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GenerationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GenerationError::Validation(_) => StatusCode::BAD_REQUEST,
            GenerationError::RateLimited { .. } | GenerationError::UpstreamRateLimited => {
                StatusCode::TOO_MANY_REQUESTS
            }
            GenerationError::UpstreamPaymentRequired => StatusCode::PAYMENT_REQUIRED,
            GenerationError::UpstreamConfig
            | GenerationError::Upstream(_)
            | GenerationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> String {
        match self {
            GenerationError::Validation(message) => message.clone(),
            GenerationError::RateLimited {
                max_requests,
                window_minutes,
            } => format!(
                "Rate limit exceeded: you can generate up to {} diagrams every {} minutes. Please try again later.",
                max_requests, window_minutes
            ),
            GenerationError::UpstreamConfig => "AI service not configured".to_string(),
            GenerationError::UpstreamRateLimited => {
                "Rate limits exceeded, please try again later.".to_string()
            }
            GenerationError::UpstreamPaymentRequired => {
                "Payment required, please add funds to your AI workspace.".to_string()
            }
            GenerationError::Upstream(_) => "Failed to generate diagram".to_string(),
            GenerationError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<CompletionError> for GenerationError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::MissingApiKey => GenerationError::UpstreamConfig,
            CompletionError::RateLimited => GenerationError::UpstreamRateLimited,
            CompletionError::PaymentRequired => GenerationError::UpstreamPaymentRequired,
            CompletionError::Status { .. }
            | CompletionError::EmptyContent
            | CompletionError::Transport(_)
            | CompletionError::Decode(_) => GenerationError::Upstream(err.to_string()),
        }
    }
}

/// One generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: DiagramStyle,
    /// Quota key; no quota check when absent
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDiagram {
    pub diagram: String,
    pub template: Option<Template>,
    pub diagram_type: Option<&'static str>,
}

pub struct DiagramGenerator {
    compiler: PromptCompiler,
    completion: Arc<dyn CompletionClient>,
    quota: Arc<dyn QuotaGate>,
    policy: QuotaPolicy,
}

impl DiagramGenerator {
    pub fn new(
        compiler: PromptCompiler,
        completion: Arc<dyn CompletionClient>,
        quota: Arc<dyn QuotaGate>,
        policy: QuotaPolicy,
    ) -> Self {
        Self {
            compiler,
            completion,
            quota,
            policy,
        }
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedDiagram, GenerationError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::Validation("Prompt is required".to_string()));
        }

        if let Some(user_id) = request.user_id.as_deref().filter(|id| !id.is_empty()) {
            self.check_quota(user_id).await?;
        }

        let compiled = self.compiler.compile(prompt, request.style);
        info!(
            style = request.style.as_tag(),
            template = ?compiled.template,
            "Generating diagram"
        );

        let messages = [
            ChatMessage::system(compiled.system),
            ChatMessage::user(compiled.user),
        ];
        let raw = self.completion.complete(&messages).await.map_err(|e| {
            let mapped = GenerationError::from(e);
            if mapped.status_code().is_server_error() {
                error!("Completion request failed: {}", mapped);
            }
            mapped
        })?;

        let sanitized = sanitize_diagram(&raw);
        if sanitized.text.is_empty() {
            error!("Completion produced no diagram text after cleanup");
            return Err(GenerationError::Upstream(
                "empty diagram after cleanup".to_string(),
            ));
        }
        if sanitized.diagram_type.is_none() {
            warn!("No diagram keyword found in completion; returning best-effort text");
        }

        info!(diagram_type = ?sanitized.diagram_type, "Diagram generated");
        Ok(GeneratedDiagram {
            diagram: sanitized.text,
            template: compiled.template,
            diagram_type: sanitized.diagram_type,
        })
    }

    /// Fails open: an unreachable quota backend does not block generation.
    async fn check_quota(&self, user_id: &str) -> Result<(), GenerationError> {
        match self.quota.try_acquire(user_id, &self.policy).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(user_id, "Generation quota exceeded");
                Err(GenerationError::RateLimited {
                    max_requests: self.policy.max_requests,
                    window_minutes: self.policy.window_minutes,
                })
            }
            Err(e) => {
                warn!(user_id, "Quota check failed, allowing request: {}", e);
                Ok(())
            }
        }
    }
}
