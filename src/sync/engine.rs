use crate::{
    config::{BaselineConfig, StorageKeys},
    domain::{
        board::Board,
        card::{CardId, CardUpdate},
        mutation::DropLocation,
    },
    error::Result,
    storage::KeyValueStore,
    sync::{
        state::{Intent, PendingSync, SyncState},
        strategy::ReconcileStrategy,
    },
};
use tracing::debug;

/// Owns the store and the current [`SyncState`].
///
/// Every intent runs through [`SyncState::apply`]; the resulting board and
/// version are written back before the new state is adopted, so a storage
/// failure leaves the in-memory state where it was.
pub struct BoardSync<S: KeyValueStore> {
    store: S,
    keys: StorageKeys,
    state: SyncState,
}

impl<S: KeyValueStore> BoardSync<S> {
    /// Loads using the default `board` / `board-version` keys
    pub async fn load(store: S, baseline: BaselineConfig) -> Result<Self> {
        Self::load_with_keys(store, baseline, StorageKeys::default()).await
    }

    pub async fn load_with_keys(
        store: S,
        baseline: BaselineConfig,
        keys: StorageKeys,
    ) -> Result<Self> {
        let blob = store.get(&keys.board).await?;
        let version = store.get(&keys.version).await?;
        let state = SyncState::initialize(blob.as_deref(), version.as_deref(), baseline);

        write_state(&store, &keys, &state).await?;
        Ok(Self { store, keys, state })
    }

    pub fn board(&self) -> &Board {
        self.state.board()
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Old and new version while a reconciliation prompt should be shown
    pub fn pending_sync(&self) -> Option<PendingSync> {
        self.state.pending_sync()
    }

    /// Applies an intent and persists the outcome
    pub async fn dispatch(&mut self, intent: Intent) -> Result<()> {
        let clears_storage = matches!(intent, Intent::ClearPersistedState);
        let next = self.state.clone().apply(intent);

        if clears_storage {
            self.store.remove(&self.keys.board).await?;
            self.store.remove(&self.keys.version).await?;
            debug!("cleared persisted board");
        } else {
            write_state(&self.store, &self.keys, &next).await?;
        }

        self.state = next;
        Ok(())
    }

    pub async fn add_card(&mut self, stage_id: &str, title: &str) -> Result<()> {
        self.dispatch(Intent::AddCard {
            stage_id: stage_id.to_string(),
            title: title.to_string(),
        })
        .await
    }

    pub async fn move_card(
        &mut self,
        source: DropLocation,
        destination: DropLocation,
        card_id: CardId,
    ) -> Result<()> {
        self.dispatch(Intent::MoveCard {
            source,
            destination,
            card_id,
        })
        .await
    }

    pub async fn edit_card(&mut self, card_id: CardId, updates: CardUpdate) -> Result<()> {
        self.dispatch(Intent::EditCard { card_id, updates }).await
    }

    pub async fn delete_card(&mut self, card_id: CardId) -> Result<()> {
        self.dispatch(Intent::DeleteCard { card_id }).await
    }

    pub async fn edit_column(&mut self, stage_id: &str, new_name: &str) -> Result<()> {
        self.dispatch(Intent::EditColumn {
            stage_id: stage_id.to_string(),
            new_name: new_name.to_string(),
        })
        .await
    }

    pub async fn resolve_sync(&mut self, strategy: ReconcileStrategy) -> Result<()> {
        self.dispatch(Intent::ResolveSync { strategy }).await
    }

    /// Resolves using a strategy name such as `"smartMerge"`
    pub async fn resolve_sync_named(&mut self, strategy: &str) -> Result<()> {
        let strategy: ReconcileStrategy = strategy.parse()?;
        self.resolve_sync(strategy).await
    }

    pub async fn reset_to_baseline(&mut self) -> Result<()> {
        self.dispatch(Intent::ResetToBaseline).await
    }

    pub async fn clear_persisted_state(&mut self) -> Result<()> {
        self.dispatch(Intent::ClearPersistedState).await
    }
}

async fn write_state<S: KeyValueStore>(
    store: &S,
    keys: &StorageKeys,
    state: &SyncState,
) -> Result<()> {
    store.set(&keys.board, &state.board().to_json()?).await?;
    if let Some(version) = state.persisted_version() {
        store.set(&keys.version, version).await?;
    }
    debug!(version = ?state.persisted_version(), "board saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{board::Stage, card::Card},
        error::KanbanError,
        storage::MemoryStore,
    };
    use async_trait::async_trait;

    fn baseline(version: &str, stages: Vec<Stage>) -> BaselineConfig {
        BaselineConfig::new(version, Board::new(stages)).unwrap()
    }

    fn baseline_v1() -> BaselineConfig {
        baseline("1", vec![Stage::new("s1", "Todo", 0)])
    }

    fn baseline_v2() -> BaselineConfig {
        baseline(
            "2",
            vec![Stage::new("s1", "To Do", 0), Stage::new("s2", "Done", 1)],
        )
    }

    fn saved_board() -> Board {
        Board::new(vec![
            Stage::new("s1", "Todo", 0).with_cards(vec![Card::new(CardId::new("c1"), "One", 0)])
        ])
    }

    fn store_with_saved(version: &str) -> MemoryStore {
        MemoryStore::with_entries([
            ("board", saved_board().to_json().unwrap()),
            ("board-version", version.to_string()),
        ])
    }

    async fn stored_board(sync: &BoardSync<MemoryStore>) -> Board {
        let json = sync.store().get("board").await.unwrap().unwrap();
        Board::from_json(&json).unwrap()
    }

    async fn stored_version(sync: &BoardSync<MemoryStore>) -> Option<String> {
        sync.store().get("board-version").await.unwrap()
    }

    #[tokio::test]
    async fn test_first_load_persists_baseline() {
        let sync = BoardSync::load(MemoryStore::new(), baseline_v1()).await.unwrap();

        assert!(!sync.is_pending());
        assert_eq!(sync.board(), &baseline_v1().board);
        assert_eq!(stored_version(&sync).await.as_deref(), Some("1"));
        assert_eq!(stored_board(&sync).await, baseline_v1().board);
    }

    #[tokio::test]
    async fn test_same_version_load_keeps_saved_board() {
        let sync = BoardSync::load(store_with_saved("1"), baseline_v1())
            .await
            .unwrap();

        assert!(!sync.is_pending());
        assert_eq!(sync.board(), &saved_board());
    }

    #[tokio::test]
    async fn test_unreadable_board_recovers_to_baseline() {
        let store = MemoryStore::with_entries([("board", "[[["), ("board-version", "1")]);
        let sync = BoardSync::load(store, baseline_v2()).await.unwrap();

        assert!(!sync.is_pending());
        assert_eq!(sync.board(), &baseline_v2().board);
        assert_eq!(stored_version(&sync).await.as_deref(), Some("2"));
        assert_eq!(stored_board(&sync).await, baseline_v2().board);
    }

    #[tokio::test]
    async fn test_version_bump_then_smart_merge() {
        let mut sync = BoardSync::load(store_with_saved("1"), baseline_v2())
            .await
            .unwrap();

        assert!(sync.is_pending());
        assert_eq!(sync.board(), &saved_board());
        // the stored version does not move until a strategy is chosen
        assert_eq!(stored_version(&sync).await.as_deref(), Some("1"));
        assert_eq!(
            sync.pending_sync().map(|p| (p.old_version, p.new_version)),
            Some(("1".to_string(), "2".to_string()))
        );

        sync.resolve_sync_named("smartMerge").await.unwrap();

        assert!(!sync.is_pending());
        let board = sync.board();
        assert_eq!(board.stages.len(), 2);
        assert_eq!(board.stages[0].id, "s1");
        assert_eq!(board.stages[0].name, "To Do");
        assert_eq!(board.stages[0].cards, saved_board().stages[0].cards);
        assert_eq!(board.stages[1].id, "s2");
        assert!(board.stages[1].cards.is_empty());

        assert_eq!(stored_version(&sync).await.as_deref(), Some("2"));
        assert_eq!(&stored_board(&sync).await, sync.board());

        // reloading with the same baseline no longer prompts
        let store = MemoryStore::with_entries([
            ("board", sync.board().to_json().unwrap()),
            ("board-version", "2".to_string()),
        ]);
        let reloaded = BoardSync::load(store, baseline_v2()).await.unwrap();
        assert!(!reloaded.is_pending());
    }

    #[tokio::test]
    async fn test_unknown_strategy_name_is_rejected() {
        let mut sync = BoardSync::load(store_with_saved("1"), baseline_v2())
            .await
            .unwrap();

        let err = sync.resolve_sync_named("mergeEverything").await.unwrap_err();
        assert!(matches!(err, KanbanError::UnknownStrategy(_)));
        assert!(sync.is_pending());
    }

    #[tokio::test]
    async fn test_edits_are_persisted() {
        let mut sync = BoardSync::load(MemoryStore::new(), baseline_v2())
            .await
            .unwrap();

        sync.add_card("s1", "First").await.unwrap();
        let card_id = sync.board().stages[0].cards[0].id.clone();

        sync.move_card(
            DropLocation::new("s1", 0),
            DropLocation::new("s2", 0),
            card_id.clone(),
        )
        .await
        .unwrap();
        sync.edit_card(card_id.clone(), CardUpdate::default().title("Renamed"))
            .await
            .unwrap();
        sync.edit_column("s2", "Shipped").await.unwrap();

        let stored = stored_board(&sync).await;
        assert_eq!(&stored, sync.board());
        let done = stored.stage("s2").unwrap();
        assert_eq!(done.name, "Shipped");
        assert_eq!(done.cards[0].title, "Renamed");
        assert_eq!(done.cards[0].order, 0);
        assert!(stored.stage("s1").unwrap().cards.is_empty());

        sync.delete_card(card_id).await.unwrap();
        assert_eq!(stored_board(&sync).await.card_count(), 0);
    }

    #[tokio::test]
    async fn test_edits_ignored_while_pending() {
        let mut sync = BoardSync::load(store_with_saved("1"), baseline_v2())
            .await
            .unwrap();

        sync.add_card("s1", "Too early").await.unwrap();
        sync.delete_card(CardId::new("c1")).await.unwrap();

        assert_eq!(sync.board(), &saved_board());
        assert!(sync.is_pending());
    }

    #[tokio::test]
    async fn test_reset_to_baseline() {
        let mut sync = BoardSync::load(store_with_saved("1"), baseline_v2())
            .await
            .unwrap();

        sync.reset_to_baseline().await.unwrap();

        assert!(!sync.is_pending());
        assert_eq!(sync.board(), &baseline_v2().board);
        assert_eq!(stored_board(&sync).await, baseline_v2().board);
        assert_eq!(stored_version(&sync).await.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_clear_persisted_state_removes_keys() {
        let mut sync = BoardSync::load(store_with_saved("1"), baseline_v1())
            .await
            .unwrap();

        sync.clear_persisted_state().await.unwrap();

        assert_eq!(sync.board(), &baseline_v1().board);
        assert_eq!(sync.store().get("board").await.unwrap(), None);
        assert_eq!(stored_version(&sync).await, None);
    }

    #[tokio::test]
    async fn test_custom_storage_keys() {
        let keys = StorageKeys::with_prefix("kanban-board");
        let sync = BoardSync::load_with_keys(MemoryStore::new(), baseline_v1(), keys)
            .await
            .unwrap();

        assert!(sync.store().get("kanban-board").await.unwrap().is_some());
        assert_eq!(
            sync.store()
                .get("kanban-board-version")
                .await
                .unwrap()
                .as_deref(),
            Some("1")
        );
        assert_eq!(sync.store().get("board").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_edits_after_clear_survive_reload() {
        let mut sync = BoardSync::load(MemoryStore::new(), baseline_v1())
            .await
            .unwrap();

        sync.clear_persisted_state().await.unwrap();
        sync.add_card("s1", "after clear").await.unwrap();
        assert_eq!(stored_version(&sync).await.as_deref(), Some("1"));

        let store = MemoryStore::with_entries([
            ("board", sync.store().get("board").await.unwrap().unwrap()),
            ("board-version", stored_version(&sync).await.unwrap()),
        ]);
        let reloaded = BoardSync::load(store, baseline_v1()).await.unwrap();
        assert!(!reloaded.is_pending());
        assert_eq!(reloaded.board().card_count(), 1);
        assert_eq!(reloaded.board().stages[0].cards[0].title, "after clear");
    }

    #[tokio::test]
    async fn test_edit_of_typed_field_by_name_survives_reload() {
        let mut sync = BoardSync::load(store_with_saved("1"), baseline_v1())
            .await
            .unwrap();

        sync.edit_card(
            CardId::new("c1"),
            CardUpdate::default().field("title", "x").field("order", 4),
        )
        .await
        .unwrap();

        let stored = stored_board(&sync).await;
        assert_eq!(stored.stages[0].cards[0].title, "x");
        assert_eq!(stored.stages[0].cards[0].order, 4);

        let store = MemoryStore::with_entries([
            ("board", stored.to_json().unwrap()),
            ("board-version", "1".to_string()),
        ]);
        let reloaded = BoardSync::load(store, baseline_v1()).await.unwrap();
        assert_eq!(reloaded.board(), &stored);
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(KanbanError::StorageError("quota exceeded".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let result = BoardSync::load(FailingStore, baseline_v1()).await;
        assert!(matches!(result, Err(KanbanError::StorageError(_))));
    }

    #[cfg(feature = "file-storage")]
    #[tokio::test]
    async fn test_file_store_round_trip() {
        use crate::storage::FileStore;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let mut sync = BoardSync::load(FileStore::new(temp_dir.path()), baseline_v1())
            .await
            .unwrap();
        sync.add_card("s1", "Persist me").await.unwrap();

        let reloaded = BoardSync::load(FileStore::new(temp_dir.path()), baseline_v1())
            .await
            .unwrap();
        assert_eq!(reloaded.board(), sync.board());

        let bumped = BoardSync::load(FileStore::new(temp_dir.path()), baseline_v2())
            .await
            .unwrap();
        assert!(bumped.is_pending());
    }
}
