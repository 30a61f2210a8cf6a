//! Public share-link reader.

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::get,
};
use chrono::Utc;
use tracing::info;

use super::app_state::AppState;
use super::error::ApiError;
use crate::models::SharedDiagramView;

/// Create the shared diagram router
pub fn shared_router() -> Router<AppState> {
    Router::new().route("/shared/{share_token}", get(get_shared_diagram))
}

/// GET /shared/{share_token} - Read a published diagram without authentication
///
/// Visibility is decided now: a public record whose expiration has passed is
/// reported as not found, whatever its stored flag says.
#[utoipa::path(
    get,
    path = "/shared/{share_token}",
    tag = "Sharing",
    params(("share_token" = String, Path, description = "Share token")),
    responses(
        (status = 200, description = "Shared diagram", body = SharedDiagramView),
        (status = 404, description = "Not found, not shared, or expired")
    )
)]
pub async fn get_shared_diagram(
    State(state): State<AppState>,
    Path(share_token): Path<String>,
) -> Result<Json<SharedDiagramView>, ApiError> {
    let record = state
        .store
        .find_by_share_token(&share_token)
        .await?
        .filter(|record| record.is_public)
        .ok_or_else(|| ApiError::not_found("Diagram not found or not shared"))?;

    let now = Utc::now();
    if !record.is_publicly_visible(now) {
        info!(diagram_id = %record.id, "Share link expired");
        return Err(ApiError::not_found("This share link has expired"));
    }

    Ok(Json(SharedDiagramView::from(record)))
}
