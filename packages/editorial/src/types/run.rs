//! Run summaries, per-item results, and audit events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of a single item's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemOutcome {
    Publish,
    Skip,
    Error,
}

/// Result of processing one intake item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub intake_id: Uuid,
    /// Reported to callers under the wire name `decision`
    #[serde(rename = "decision")]
    pub outcome: ItemOutcome,
    pub reason: String,
    pub card_id: Option<Uuid>,
    #[serde(default)]
    pub entity_ids: Vec<Uuid>,
    #[serde(default)]
    pub relationship_ids: Vec<Uuid>,
}

impl ItemResult {
    pub fn skip(intake_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            intake_id,
            outcome: ItemOutcome::Skip,
            reason: reason.into(),
            card_id: None,
            entity_ids: Vec::new(),
            relationship_ids: Vec::new(),
        }
    }

    pub fn error(intake_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            intake_id,
            outcome: ItemOutcome::Error,
            reason: reason.into(),
            card_id: None,
            entity_ids: Vec::new(),
            relationship_ids: Vec::new(),
        }
    }
}

/// Aggregated summary returned to the invoking scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub processed: usize,
    pub published: usize,
    pub skipped: usize,
    pub errors: usize,
    pub dry_run: bool,
    pub results: Vec<ItemResult>,
}

impl RunSummary {
    /// Summary for a run that did nothing (kill switch engaged).
    pub fn empty(run_id: Uuid, started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            run_id,
            started_at,
            completed_at: Utc::now(),
            processed: 0,
            published: 0,
            skipped: 0,
            errors: 0,
            dry_run,
            results: Vec::new(),
        }
    }
}

/// Audit event emitted when an item is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub card_id: Uuid,
    pub source_id: Uuid,
    pub entity_ids: Vec<Uuid>,
    pub relationship_ids: Vec<Uuid>,
    pub confidence: f64,
    pub run_id: Uuid,
    /// Marks the publish as pipeline-driven rather than manual
    pub automated: bool,
    pub occurred_at: DateTime<Utc>,
}
