//! # Kanban Sync Core
//!
//! Board model, pure board mutations, derived member status, and the
//! reconciliation between a locally saved board and a versioned baseline
//! configuration.
//!
//! Rendering and drag handling live elsewhere; they call into this crate
//! with intents and render whatever board comes back.

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use config::{BaselineConfig, StorageKeys};
pub use domain::{
    board::{Board, Stage},
    card::{Card, CardId, CardUpdate},
    mutation::DropLocation,
};
pub use error::{KanbanError, Result};
pub use storage::{KeyValueStore, MemoryStore};
pub use sync::{BoardSync, Intent, ReconcileStrategy, SyncState};
