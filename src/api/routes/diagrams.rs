//! Diagram history and sharing routes.
//!
//! Every route here requires a bearer token; records are scoped to its subject.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::{DiagramRecord, NewDiagram, SharingUpdate};
use crate::storage::{DEFAULT_HISTORY_LIMIT, DiagramEventKind, MAX_HISTORY_LIMIT};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagramListResponse {
    pub diagrams: Vec<DiagramRecord>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareResponse {
    pub id: Uuid,
    pub is_public: bool,
    pub share_token: String,
    pub share_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Create the diagram history router
pub fn diagrams_router() -> Router<AppState> {
    Router::new()
        .route("/diagrams", get(list_diagrams).post(create_diagram))
        .route("/diagrams/{id}", get(get_diagram).delete(delete_diagram))
        .route("/diagrams/{id}/share", put(update_sharing))
}

/// GET /diagrams - Most recent diagrams of the caller
#[utoipa::path(
    get,
    path = "/diagrams",
    tag = "Diagrams",
    params(
        ("limit" = Option<usize>, Query, description = "Maximum number of records (default 20, max 100)")
    ),
    responses(
        (status = 200, description = "Diagram history", body = DiagramListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_diagrams(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<DiagramListResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let diagrams = state.store.list_for_user(auth.user_id, limit).await?;
    Ok(Json(DiagramListResponse { diagrams }))
}

/// POST /diagrams - Save a generated diagram
#[utoipa::path(
    post,
    path = "/diagrams",
    tag = "Diagrams",
    request_body = NewDiagram,
    responses(
        (status = 201, description = "Diagram saved", body = DiagramRecord),
        (status = 400, description = "Prompt or diagram missing"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_diagram(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(diagram): Json<NewDiagram>,
) -> Result<(StatusCode, Json<DiagramRecord>), ApiError> {
    if diagram.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt is required"));
    }
    if diagram.diagram_data.trim().is_empty() {
        return Err(ApiError::bad_request("Diagram is required"));
    }

    let record = state.store.insert(auth.user_id, diagram).await?;
    state
        .events
        .publish(DiagramEventKind::Insert, record.user_id, record.id);
    info!(diagram_id = %record.id, "Diagram saved");

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /diagrams/{id} - Fetch one of the caller's diagrams
#[utoipa::path(
    get,
    path = "/diagrams/{id}",
    tag = "Diagrams",
    params(("id" = Uuid, Path, description = "Diagram UUID")),
    responses(
        (status = 200, description = "Diagram", body = DiagramRecord),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Diagram not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_diagram(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<DiagramRecord>, ApiError> {
    state
        .store
        .get(id)
        .await?
        .filter(|record| record.user_id == auth.user_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Diagram not found"))
}

/// DELETE /diagrams/{id} - Delete one of the caller's diagrams
#[utoipa::path(
    delete,
    path = "/diagrams/{id}",
    tag = "Diagrams",
    params(("id" = Uuid, Path, description = "Diagram UUID")),
    responses(
        (status = 204, description = "Diagram deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Diagram not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_diagram(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(id, auth.user_id).await?;
    state
        .events
        .publish(DiagramEventKind::Delete, auth.user_id, id);
    info!(diagram_id = %id, "Diagram deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /diagrams/{id}/share - Publish or unpublish a diagram
#[utoipa::path(
    put,
    path = "/diagrams/{id}/share",
    tag = "Diagrams",
    params(("id" = Uuid, Path, description = "Diagram UUID")),
    request_body = SharingUpdate,
    responses(
        (status = 200, description = "Sharing updated", body = ShareResponse),
        (status = 400, description = "Expiration is not in the future"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Diagram not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_sharing(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(update): Json<SharingUpdate>,
) -> Result<Json<ShareResponse>, ApiError> {
    if update.is_public && update.expires_at.is_some_and(|at| at <= Utc::now()) {
        return Err(ApiError::bad_request("Expiration must be in the future"));
    }

    let record = state.store.update_sharing(id, auth.user_id, update).await?;
    state
        .events
        .publish(DiagramEventKind::Update, record.user_id, record.id);

    Ok(Json(ShareResponse {
        id: record.id,
        is_public: record.is_public,
        share_url: state.share_url(&record.share_token),
        share_token: record.share_token,
        expires_at: record.expires_at,
    }))
}
