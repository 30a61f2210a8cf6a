//! Wire types for the diagram generation endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inbound body of `POST /generate-diagram`.
///
/// Every field is optional at the serde level so that a missing prompt is
/// reported as a validation failure instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GenerateDiagramRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default, rename = "userId", alias = "user_id")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateDiagramResponse {
    pub diagram: String,
}
