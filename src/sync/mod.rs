//! Reconciliation between the locally persisted board and the shipped baseline.
//!
//! [`SyncState`] is a pure reducer over [`Intent`]s; [`BoardSync`] drives it
//! and is the only thing that reads or writes the store.

pub mod engine;
pub mod state;
pub mod strategy;

pub use engine::BoardSync;
pub use state::{Intent, PendingSync, SyncState};
pub use strategy::{apply_strategy, ReconcileStrategy};
