//! Diagram generation record and its public projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::DiagramStyle;

/// A saved diagram together with its sharing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagramRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub style: DiagramStyle,
    /// Mermaid source as returned by the generator
    pub diagram_data: String,
    pub created_at: DateTime<Utc>,
    pub is_public: bool,
    pub share_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl DiagramRecord {
    /// Build a fresh private record with a newly minted share token.
    pub fn new(user_id: Uuid, diagram: NewDiagram) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            prompt: diagram.prompt,
            style: diagram.style,
            diagram_data: diagram.diagram_data,
            created_at: Utc::now(),
            is_public: false,
            share_token: new_share_token(),
            expires_at: None,
        }
    }

    /// Whether the record may be served through its share token at `now`.
    ///
    /// Expiry is evaluated here, at read time; nothing is stored to reflect it.
    pub fn is_publicly_visible(&self, now: DateTime<Utc>) -> bool {
        self.is_public && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn apply_sharing(&mut self, update: &SharingUpdate) {
        self.is_public = update.is_public;
        self.expires_at = update.expires_at;
    }
}

/// Opaque share token: 32 lowercase hex characters.
pub fn new_share_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Payload for saving a generated diagram to history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewDiagram {
    pub prompt: String,
    #[serde(default)]
    pub style: DiagramStyle,
    #[serde(alias = "diagram")]
    pub diagram_data: String,
}

/// Visibility change for a saved diagram.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SharingUpdate {
    pub is_public: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// What an unauthenticated reader sees through a share link.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SharedDiagramView {
    pub prompt: String,
    pub style: DiagramStyle,
    pub diagram_data: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<DiagramRecord> for SharedDiagramView {
    fn from(record: DiagramRecord) -> Self {
        Self {
            prompt: record.prompt,
            style: record.style,
            diagram_data: record.diagram_data,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}
