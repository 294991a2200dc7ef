//! Typed errors for the editorial pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during editorial review operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// LLM transport failed (the call itself, not its content)
    #[error("review model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// LLM response was unparseable or missing a valid `decision` field
    #[error("invalid review response: {0}")]
    InvalidResponse(String),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Snapshot capture failed
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Intake item not found in store
    #[error("intake item not found: {id}")]
    ItemNotFound { id: Uuid },

    /// Card not found in store
    #[error("card not found: {id}")]
    CardNotFound { id: Uuid },

    /// Relationship not found in store
    #[error("relationship not found: {id}")]
    RelationshipNotFound { id: Uuid },

    /// Source not found in store
    #[error("source not found: {id}")]
    SourceNotFound { id: Uuid },

    /// Publishing a card or relationship without any source reference
    #[error("record {id} has no source references")]
    MissingSourceRef { id: Uuid },

    /// Publishing a card whose cited source is not verified
    #[error("card {card_id} cites unverified source {source_id}")]
    UnverifiedSource { card_id: Uuid, source_id: Uuid },

    /// Prompt template could not be loaded
    #[error("prompt template error: {0}")]
    Template(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// JSON serialization error (prompt rendering)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Every processed item ended in ERROR; surfaced for scheduler alerting
    #[error("run {run_id} failed: all {processed} items errored")]
    RunFailed { run_id: Uuid, processed: usize },
}

/// Result type alias for editorial operations.
pub type Result<T> = std::result::Result<T, ReviewError>;
