use crate::{
    domain::board::{Board, Stage},
    error::{KanbanError, Result},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Versioned board shipped with the application.
///
/// Bumping `version` is how a new column layout reaches users who already
/// have a board saved locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    pub version: String,
    pub board: Board,
}

impl BaselineConfig {
    pub fn new(version: impl Into<String>, board: Board) -> Result<Self> {
        let config = Self {
            version: version.into(),
            board,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a baseline from JSON (`{ "version": ..., "board": ... }`)
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| KanbanError::ConfigError(format!("invalid baseline config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a baseline from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(KanbanError::ConfigError(
                "baseline version must not be empty".to_string(),
            ));
        }
        self.board.validate().map_err(KanbanError::ConfigError)
    }

    /// Gym membership pipeline
    pub fn fitness() -> Self {
        Self {
            version: "1".to_string(),
            board: Board::new(vec![
                Stage::new("registration", "New Registrations", 0),
                Stage::new("active", "Active Members", 1),
                Stage::new("pending-renewal", "Pending Renewal", 2),
                Stage::new("inactive", "Inactive", 3),
            ]),
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            board: Board::new(vec![
                Stage::new("todo", "To Do", 0),
                Stage::new("in-progress", "In Progress", 1),
                Stage::new("done", "Done", 2),
            ]),
        }
    }
}

/// Keys the board and its reconciled version are stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    pub board: String,
    pub version: String,
}

impl StorageKeys {
    /// Namespaced keys: `<prefix>` and `<prefix>-version`
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            board: prefix.to_string(),
            version: format!("{}-version", prefix),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix("board")
    }
}
