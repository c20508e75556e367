use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanbanError>;

#[derive(Debug, Error)]
pub enum KanbanError {
    #[error("Invalid card ID: {0:?}")]
    InvalidCardId(String),

    #[error("Unknown reconciliation strategy '{0}'. Valid strategies: replaceAll, updateColumnNames, smartMerge, keepCurrent")]
    UnknownStrategy(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
