// Middleware module - contains CORS and observability setup

pub mod cors;
pub mod observability;

pub use cors::{cors_layer_from_env, create_cors_layer, create_custom_cors_layer};
pub use observability::init_tracing;
