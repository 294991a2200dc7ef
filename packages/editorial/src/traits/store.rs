//! Storage traits for intake items, entities, sources, cards, and
//! relationships.
//!
//! The persistence layer is a keyed document store with secondary lookup
//! indexes; it offers no compound predicates and no multi-record commit.
//! The storage surface is split into focused traits, combined by the
//! blanket-implemented composite `ReviewStore`:
//! - `IntakeStore`: candidate items and their editorial annotations
//! - `EntityDirectory`: entity lookup and creation
//! - `SourceRegistry`: citable source records
//! - `CardStore`: claim-card create/publish state machine
//! - `RelationshipStore`: typed relationships, queryable by either endpoint
//! - `AuditLog`: publish audit events

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::intake::{EditorDecision, EditorStatus, IntakeItem, IntakeStatus};
use crate::types::records::{Card, Entity, Relationship, SourceRecord};
use crate::types::run::AuditEvent;

/// Intake item reads and editorial annotation.
#[async_trait]
pub trait IntakeStore: Send + Sync {
    /// A most-recent-first window of status-NEW items.
    ///
    /// The backing index supports only the status predicate; callers MUST
    /// apply full eligibility filtering client-side — this query alone never
    /// establishes eligibility.
    async fn recent_items(&self, limit: usize) -> Result<Vec<IntakeItem>>;

    /// Fetch a single item.
    async fn get_item(&self, id: Uuid) -> Result<Option<IntakeItem>>;

    /// Terminate an item: set its processing status, editor status, and
    /// immutable editor decision in one write.
    async fn record_decision(
        &self,
        id: Uuid,
        status: IntakeStatus,
        editor_status: EditorStatus,
        decision: &EditorDecision,
    ) -> Result<()>;
}

/// Entity lookup and creation.
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    /// Fetch an entity by id.
    async fn get_entity(&self, id: Uuid) -> Result<Option<Entity>>;

    /// Look up an entity by normalized name (see [`crate::types::records::normalize_name`]).
    async fn find_entity_by_normalized_name(&self, normalized: &str) -> Result<Option<Entity>>;

    /// Create a new entity.
    async fn create_entity(&self, entity: &Entity) -> Result<()>;
}

/// Citable source records.
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    /// Create a source record.
    async fn create_source(&self, source: &SourceRecord) -> Result<()>;

    /// Fetch a source by id.
    async fn get_source(&self, id: Uuid) -> Result<Option<SourceRecord>>;
}

/// Claim-card create/publish state machine.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Create a card (Draft).
    async fn create_card(&self, card: &Card) -> Result<()>;

    /// Publish a card.
    ///
    /// Enforces the invariant that a published card cites at least one
    /// source reference pointing to a verified source; fails with
    /// `MissingSourceRef` or `UnverifiedSource` otherwise.
    async fn publish_card(&self, id: Uuid) -> Result<()>;

    /// Fetch a card by id.
    async fn get_card(&self, id: Uuid) -> Result<Option<Card>>;

    /// The most recently published cards, newest first, up to `limit`.
    ///
    /// This is the duplicate detector's bounded window.
    async fn recent_published_cards(&self, limit: usize) -> Result<Vec<Card>>;
}

/// Typed relationships between entities.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Create a relationship (Draft).
    async fn create_relationship(&self, relationship: &Relationship) -> Result<()>;

    /// Publish a relationship. Requires at least one source reference.
    async fn publish_relationship(&self, id: Uuid) -> Result<()>;

    /// Fetch a relationship by id.
    async fn get_relationship(&self, id: Uuid) -> Result<Option<Relationship>>;

    /// All relationships touching an entity, as either endpoint.
    ///
    /// Implementations keep a secondary index per endpoint and must keep
    /// both consistent on every create and publish.
    async fn relationships_for_entity(&self, entity_id: Uuid) -> Result<Vec<Relationship>>;
}

/// Publish audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Record a publish audit event.
    async fn record_publish(&self, event: &AuditEvent) -> Result<()>;
}

/// Composite storage trait combining every pipeline concern.
///
/// This is the bound the orchestrator and run controller use.
pub trait ReviewStore:
    IntakeStore + EntityDirectory + SourceRegistry + CardStore + RelationshipStore + AuditLog
{
}

// Blanket implementation: anything implementing all six traits is a ReviewStore
impl<T> ReviewStore for T where
    T: IntakeStore + EntityDirectory + SourceRegistry + CardStore + RelationshipStore + AuditLog
{
}
