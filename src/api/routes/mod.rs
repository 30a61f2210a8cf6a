//! API routes module - organizes all route handlers.

pub mod app_state;
pub mod auth_context;
pub mod diagrams;
pub mod error;
pub mod events;
pub mod generate;
pub mod openapi;
pub mod shared;

use axum::{Router, response::Json, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use app_state::AppState;

use crate::middleware::cors_layer_from_env;

/// Create the API router combining all route modules.
///
/// State is applied by the caller (see [`build_app`]).
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(generate::generate_router())
        .merge(events::events_router())
        .merge(diagrams::diagrams_router())
        .merge(shared::shared_router())
        .merge(openapi::openapi_router())
        .route("/health", get(health_check))
}

/// Full application: health check, API under /api/v1, tracing and CORS.
pub fn build_app(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_api_router())
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer_from_env()),
        )
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "diagram-gen-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
