//! Diagram generation route.

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
    routing::post,
};
use tracing::warn;

use super::app_state::AppState;
use super::error::ApiError;
use crate::models::{DiagramStyle, GenerateDiagramRequest, GenerateDiagramResponse};
use crate::services::{GenerationError, GenerationRequest};

/// Create the generation router
pub fn generate_router() -> Router<AppState> {
    Router::new().route("/generate-diagram", post(generate_diagram))
}

/// POST /generate-diagram - Turn a description into Mermaid markup
#[utoipa::path(
    post,
    path = "/generate-diagram",
    tag = "Generation",
    request_body = GenerateDiagramRequest,
    responses(
        (status = 200, description = "Diagram generated", body = GenerateDiagramResponse),
        (status = 400, description = "Prompt missing or body malformed"),
        (status = 402, description = "AI service payment required"),
        (status = 429, description = "User quota or AI service rate limit exceeded"),
        (status = 500, description = "AI service misconfigured or failed")
    )
)]
pub async fn generate_diagram(
    State(state): State<AppState>,
    payload: Result<Json<GenerateDiagramRequest>, JsonRejection>,
) -> Result<Json<GenerateDiagramResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected generate-diagram body: {}", e);
        ApiError::bad_request("Invalid request body")
    })?;

    let generation = GenerationRequest {
        prompt: request.prompt.unwrap_or_default(),
        style: DiagramStyle::from_tag(request.style.as_deref().unwrap_or_default()),
        user_id: request.user_id,
    };

    // Runs detached: a client disconnect does not abort the upstream call.
    let generator = state.generator.clone();
    let generated = tokio::spawn(async move { generator.generate(&generation).await })
        .await
        .map_err(|e| GenerationError::Internal(e.to_string()))??;

    Ok(Json(GenerateDiagramResponse {
        diagram: generated.diagram,
    }))
}
