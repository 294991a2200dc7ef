//! Intake items: candidate claim sources awaiting editorial review.
//!
//! Items are created by ingestion, annotated by extraction, and terminated
//! exactly once by this pipeline (Promoted+Approved or Rejected+Skipped).
//! They are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Processing status of an intake item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeStatus {
    /// Fresh from ingestion, not yet reviewed
    New,
    /// Published as a card
    Promoted,
    /// Reviewed and skipped
    Rejected,
}

/// Status of the upstream extraction job for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionStatus {
    Pending,
    Completed,
    Failed,
}

/// Editorial annotation, independent of the processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditorStatus {
    Approved,
    Skipped,
}

/// The outcome kind of a review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionKind {
    Publish,
    Skip,
}

/// Append-only record of why an item was or wasn't published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorDecision {
    pub decision: DecisionKind,
    pub reason: String,
    /// Clamped to [0, 1]
    pub confidence: f64,
    pub decided_at: DateTime<Utc>,
    pub run_id: Uuid,
}

/// An entity the extraction job believes the item mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedEntity {
    pub name: String,
    /// Free-text type guess from extraction
    pub entity_type: String,
    pub confidence: f32,
    /// Pre-matched entity in the directory, if extraction found one
    pub matched_entity_id: Option<Uuid>,
}

impl SuggestedEntity {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            confidence,
            matched_entity_id: None,
        }
    }

    pub fn with_match(mut self, entity_id: Uuid) -> Self {
        self.matched_entity_id = Some(entity_id);
        self
    }
}

/// A relationship the extraction job believes the item describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedRelationship {
    pub from_name: String,
    pub to_name: String,
    /// Free-text type guess from extraction
    pub relationship_type: String,
    pub description: Option<String>,
}

/// A candidate claim source, pre-editorial-review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeItem {
    pub id: Uuid,
    pub title: String,
    pub publisher: String,
    pub published_at: DateTime<Utc>,
    pub canonical_url: String,
    /// Extracted summary; empty until extraction completes
    pub summary: String,
    pub suggested_entities: Vec<SuggestedEntity>,
    pub suggested_relationships: Vec<SuggestedRelationship>,
    pub status: IntakeStatus,
    pub extraction_status: ExtractionStatus,
    /// Unset until this pipeline terminates the item
    pub editor_status: Option<EditorStatus>,
    /// Immutable once set
    pub editor_decision: Option<EditorDecision>,
    pub created_at: DateTime<Utc>,
}

impl IntakeItem {
    /// Create a new item as ingestion would: status New, extraction Pending.
    pub fn new(
        title: impl Into<String>,
        publisher: impl Into<String>,
        canonical_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            publisher: publisher.into(),
            published_at: now,
            canonical_url: canonical_url.into(),
            summary: String::new(),
            suggested_entities: Vec::new(),
            suggested_relationships: Vec::new(),
            status: IntakeStatus::New,
            extraction_status: ExtractionStatus::Pending,
            editor_status: None,
            editor_decision: None,
            created_at: now,
        }
    }

    /// Annotate the item as extraction would: summary and suggestions set,
    /// extraction marked Completed.
    pub fn with_extraction(
        mut self,
        summary: impl Into<String>,
        entities: impl IntoIterator<Item = SuggestedEntity>,
    ) -> Self {
        self.summary = summary.into();
        self.suggested_entities.extend(entities);
        self.extraction_status = ExtractionStatus::Completed;
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_suggested_relationship(mut self, rel: SuggestedRelationship) -> Self {
        self.suggested_relationships.push(rel);
        self
    }
}
