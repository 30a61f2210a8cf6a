//! In-memory diagram store, used when no database is configured.

use super::{StorageError, traits::DiagramStore};
use crate::models::{DiagramRecord, NewDiagram, SharingUpdate};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryDiagramStore {
    records: RwLock<HashMap<Uuid, DiagramRecord>>,
}

impl InMemoryDiagramStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record as-is. Lets callers seed fixed timestamps or sharing state.
    pub async fn put(&self, record: DiagramRecord) {
        self.records.write().await.insert(record.id, record);
    }
}

#[async_trait]
impl DiagramStore for InMemoryDiagramStore {
    async fn insert(
        &self,
        user_id: Uuid,
        diagram: NewDiagram,
    ) -> Result<DiagramRecord, StorageError> {
        let record = DiagramRecord::new(user_id, diagram);
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DiagramRecord>, StorageError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<DiagramRecord>, StorageError> {
        let records = self.records.read().await;
        let mut owned: Vec<DiagramRecord> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        owned.truncate(limit);
        Ok(owned)
    }

    async fn update_sharing(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: SharingUpdate,
    ) -> Result<DiagramRecord, StorageError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| StorageError::diagram_not_found(id))?;
        record.apply_sharing(&update);
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        match records.get(&id) {
            Some(r) if r.user_id == user_id => {
                records.remove(&id);
                Ok(())
            }
            _ => Err(StorageError::diagram_not_found(id)),
        }
    }

    async fn find_by_share_token(
        &self,
        share_token: &str,
    ) -> Result<Option<DiagramRecord>, StorageError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.share_token == share_token)
            .cloned())
    }
}
