use crate::{
    config::BaselineConfig,
    domain::{
        board::Board,
        card::{CardId, CardUpdate},
        mutation::{self, DropLocation},
    },
    sync::strategy::{apply_strategy, ReconcileStrategy},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A user intent, as emitted by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    #[serde(rename_all = "camelCase")]
    AddCard { stage_id: String, title: String },
    #[serde(rename_all = "camelCase")]
    MoveCard {
        source: DropLocation,
        destination: DropLocation,
        card_id: CardId,
    },
    #[serde(rename_all = "camelCase")]
    EditCard { card_id: CardId, updates: CardUpdate },
    #[serde(rename_all = "camelCase")]
    DeleteCard { card_id: CardId },
    #[serde(rename_all = "camelCase")]
    EditColumn { stage_id: String, new_name: String },
    ResolveSync { strategy: ReconcileStrategy },
    ResetToBaseline,
    ClearPersistedState,
}

impl Intent {
    /// Card and column edits, as opposed to sync control
    pub fn is_board_mutation(&self) -> bool {
        matches!(
            self,
            Self::AddCard { .. }
                | Self::MoveCard { .. }
                | Self::EditCard { .. }
                | Self::DeleteCard { .. }
                | Self::EditColumn { .. }
        )
    }
}

/// Versions involved in an outstanding reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSync {
    pub old_version: String,
    pub new_version: String,
}

/// Board state plus what is known about its persisted and baseline versions.
///
/// `persisted_board` is the snapshot a strategy reconciles against and is
/// only held while a reconciliation is pending.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncState {
    board: Board,
    persisted_board: Option<Board>,
    persisted_version: Option<String>,
    baseline: BaselineConfig,
    pending_reconciliation: bool,
}

impl SyncState {
    /// Builds the starting state from what storage held and the shipped baseline.
    ///
    /// A saved board without a saved version is treated like no saved board.
    /// A saved board that fails to parse is logged and replaced by the baseline.
    pub fn initialize(
        persisted_blob: Option<&str>,
        persisted_version: Option<&str>,
        baseline: BaselineConfig,
    ) -> Self {
        let (Some(blob), Some(saved_version)) = (persisted_blob, persisted_version) else {
            return Self::from_baseline(baseline);
        };

        let saved = match Board::from_json(blob) {
            Ok(board) => board,
            Err(error) => {
                warn!(%error, "saved board is unreadable, falling back to baseline");
                return Self::from_baseline(baseline);
            }
        };

        if saved_version == baseline.version {
            return Self {
                board: saved,
                persisted_board: None,
                persisted_version: Some(saved_version.to_string()),
                baseline,
                pending_reconciliation: false,
            };
        }

        info!(
            old_version = saved_version,
            new_version = %baseline.version,
            "baseline version changed, reconciliation pending"
        );
        Self {
            board: saved.clone(),
            persisted_board: Some(saved),
            persisted_version: Some(saved_version.to_string()),
            baseline,
            pending_reconciliation: true,
        }
    }

    fn from_baseline(baseline: BaselineConfig) -> Self {
        Self {
            board: baseline.board.clone(),
            persisted_board: None,
            persisted_version: Some(baseline.version.clone()),
            baseline,
            pending_reconciliation: false,
        }
    }

    /// Current board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn persisted_board(&self) -> Option<&Board> {
        self.persisted_board.as_ref()
    }

    /// Version the stored board was last reconciled against
    pub fn persisted_version(&self) -> Option<&str> {
        self.persisted_version.as_deref()
    }

    pub fn baseline(&self) -> &BaselineConfig {
        &self.baseline
    }

    pub fn is_pending(&self) -> bool {
        self.pending_reconciliation
    }

    pub fn pending_sync(&self) -> Option<PendingSync> {
        if !self.pending_reconciliation {
            return None;
        }
        Some(PendingSync {
            old_version: self.persisted_version.clone().unwrap_or_default(),
            new_version: self.baseline.version.clone(),
        })
    }

    /// Applies one intent and returns the next state.
    ///
    /// Board mutations are ignored while a reconciliation is pending, and
    /// `ResolveSync` is ignored when none is.
    pub fn apply(mut self, intent: Intent) -> Self {
        if self.pending_reconciliation && intent.is_board_mutation() {
            warn!(?intent, "ignoring board edit until reconciliation is resolved");
            return self;
        }

        // After a clear the board is the baseline again, so the first edit
        // written back re-seeds the baseline version alongside it.
        if intent.is_board_mutation() && self.persisted_version.is_none() {
            self.persisted_version = Some(self.baseline.version.clone());
        }

        match intent {
            Intent::AddCard { stage_id, title } => {
                self.board = mutation::add_card(&self.board, &stage_id, &title);
            }
            Intent::MoveCard {
                source,
                destination,
                card_id,
            } => {
                self.board = mutation::move_card(&self.board, &source, &destination, &card_id);
            }
            Intent::EditCard { card_id, updates } => {
                self.board = mutation::edit_card(&self.board, &card_id, &updates);
            }
            Intent::DeleteCard { card_id } => {
                self.board = mutation::delete_card(&self.board, &card_id);
            }
            Intent::EditColumn { stage_id, new_name } => {
                self.board = mutation::edit_column(&self.board, &stage_id, &new_name);
            }
            Intent::ResolveSync { strategy } => {
                if !self.pending_reconciliation {
                    warn!(%strategy, "no reconciliation pending, ignoring");
                    return self;
                }
                let persisted = self
                    .persisted_board
                    .take()
                    .unwrap_or_else(|| self.board.clone());
                self.board = apply_strategy(strategy, &persisted, &self.baseline.board);
                info!(
                    %strategy,
                    old_version = ?self.persisted_version,
                    new_version = %self.baseline.version,
                    "reconciliation resolved"
                );
                self.persisted_version = Some(self.baseline.version.clone());
                self.pending_reconciliation = false;
            }
            Intent::ResetToBaseline => {
                self.board = self.baseline.board.clone();
                self.persisted_board = None;
                self.persisted_version = Some(self.baseline.version.clone());
                self.pending_reconciliation = false;
            }
            Intent::ClearPersistedState => {
                self.board = self.baseline.board.clone();
                self.persisted_board = None;
                self.persisted_version = None;
                self.pending_reconciliation = false;
            }
        }
        self
    }
}
