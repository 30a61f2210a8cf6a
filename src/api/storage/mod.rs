//! Storage module for the API.
//!
//! Provides diagram stores for PostgreSQL and in-memory operation, plus the
//! change-notification channel.

pub mod error;
pub mod notifications;
pub mod traits;

// Storage backend implementations
pub mod memory;
pub mod postgres;

pub use error::StorageError;
pub use memory::InMemoryDiagramStore;
pub use notifications::{DiagramEvent, DiagramEventKind, DiagramEvents};
pub use postgres::PostgresDiagramStore;
pub use traits::{DEFAULT_HISTORY_LIMIT, DiagramStore, MAX_HISTORY_LIMIT};
