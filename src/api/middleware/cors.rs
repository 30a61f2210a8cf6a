//! CORS middleware configuration.

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

/// Request headers browsers may send on cross-origin calls.
pub fn allowed_headers() -> [HeaderName; 4] {
    [
        header::AUTHORIZATION,
        HeaderName::from_static("x-client-info"),
        HeaderName::from_static("apikey"),
        header::CONTENT_TYPE,
    ]
}

fn allowed_methods() -> [Method; 5] {
    [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]
}

/// Create a CORS layer that allows any origin.
///
/// Preflight `OPTIONS` requests are answered by the layer itself and never
/// reach a handler.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(allowed_methods())
        .allow_headers(allowed_headers())
}

/// Create a CORS layer restricted to the given origins.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn create_custom_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(allowed_methods())
        .allow_headers(allowed_headers())
}

/// `CORS_ALLOWED_ORIGINS` (comma separated) when set, otherwise any origin.
pub fn cors_layer_from_env() -> CorsLayer {
    match std::env::var("CORS_ALLOWED_ORIGINS") {
        Ok(list) if !list.trim().is_empty() => {
            let origins: Vec<String> = list.split(',').map(str::to_string).collect();
            create_custom_cors_layer(&origins)
        }
        _ => create_cors_layer(),
    }
}
