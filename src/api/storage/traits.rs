//! Storage trait definitions for the diagram store backends.

use crate::models::{DiagramRecord, NewDiagram, SharingUpdate};
use uuid::Uuid;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Persistence for diagram records.
///
/// Mutations take the caller's user id and treat records owned by someone
/// else as missing.
#[async_trait::async_trait]
pub trait DiagramStore: Send + Sync {
    /// Save a new private record with a fresh share token
    async fn insert(
        &self,
        user_id: Uuid,
        diagram: NewDiagram,
    ) -> Result<DiagramRecord, super::StorageError>;

    /// Get a record by id, whoever owns it
    async fn get(&self, id: Uuid) -> Result<Option<DiagramRecord>, super::StorageError>;

    /// Most recent records of a user, newest first
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<DiagramRecord>, super::StorageError>;

    /// Change visibility and expiration of an owned record
    async fn update_sharing(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: SharingUpdate,
    ) -> Result<DiagramRecord, super::StorageError>;

    /// Delete an owned record
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), super::StorageError>;

    /// Raw lookup by share token; visibility is checked by the reader
    async fn find_by_share_token(
        &self,
        share_token: &str,
    ) -> Result<Option<DiagramRecord>, super::StorageError>;
}
