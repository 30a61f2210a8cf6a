//! Change notifications for diagram records.
//!
//! Routes publish after a successful mutation; subscribers (the history
//! WebSocket) filter by user.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagramEventKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramEvent {
    #[serde(rename = "type")]
    pub kind: DiagramEventKind,
    pub user_id: Uuid,
    pub diagram_id: Uuid,
}

#[derive(Clone)]
pub struct DiagramEvents {
    tx: broadcast::Sender<DiagramEvent>,
}

impl DiagramEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Send to current subscribers. Having none is not an error.
    pub fn publish(&self, kind: DiagramEventKind, user_id: Uuid, diagram_id: Uuid) {
        let _ = self.tx.send(DiagramEvent {
            kind,
            user_id,
            diagram_id,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DiagramEvent> {
        self.tx.subscribe()
    }
}

impl Default for DiagramEvents {
    fn default() -> Self {
        Self::new()
    }
}
