//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::{ReviewError, Result};
use crate::traits::store::{
    AuditLog, CardStore, EntityDirectory, IntakeStore, RelationshipStore, SourceRegistry,
};
use crate::types::intake::{EditorDecision, EditorStatus, IntakeItem, IntakeStatus};
use crate::types::records::{
    normalize_name, Card, Entity, RecordStatus, Relationship, SourceRecord, VerificationStatus,
};
use crate::types::run::AuditEvent;

/// In-memory store backing every pipeline trait.
///
/// Useful for testing and development. Not suitable for production as data
/// is lost on restart. Each write is independently durable here too — there
/// is deliberately no multi-record commit, matching the real store's model.
pub struct MemoryStore {
    items: RwLock<HashMap<Uuid, IntakeItem>>,
    entities: RwLock<HashMap<Uuid, Entity>>,
    /// normalized name → entity id
    entity_names: RwLock<HashMap<String, Uuid>>,
    sources: RwLock<HashMap<Uuid, SourceRecord>>,
    cards: RwLock<HashMap<Uuid, Card>>,
    /// Publication order, oldest first
    published_cards: RwLock<Vec<Uuid>>,
    relationships: RwLock<HashMap<Uuid, Relationship>>,
    /// Secondary indexes, one per endpoint; kept consistent on every write
    rels_by_from: RwLock<HashMap<Uuid, Vec<Uuid>>>,
    rels_by_to: RwLock<HashMap<Uuid, Vec<Uuid>>>,
    audit_events: RwLock<Vec<AuditEvent>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            entities: RwLock::new(HashMap::new()),
            entity_names: RwLock::new(HashMap::new()),
            sources: RwLock::new(HashMap::new()),
            cards: RwLock::new(HashMap::new()),
            published_cards: RwLock::new(Vec::new()),
            relationships: RwLock::new(HashMap::new()),
            rels_by_from: RwLock::new(HashMap::new()),
            rels_by_to: RwLock::new(HashMap::new()),
            audit_events: RwLock::new(Vec::new()),
        }
    }

    /// Insert an intake item as ingestion would.
    pub fn seed_item(&self, item: IntakeItem) {
        self.items.write().unwrap().insert(item.id, item);
    }

    /// Number of entities in the directory.
    pub fn entity_count(&self) -> usize {
        self.entities.read().unwrap().len()
    }

    /// Number of cards, any status.
    pub fn card_count(&self) -> usize {
        self.cards.read().unwrap().len()
    }

    /// Number of source records.
    pub fn source_count(&self) -> usize {
        self.sources.read().unwrap().len()
    }

    /// Number of relationships, any status.
    pub fn relationship_count(&self) -> usize {
        self.relationships.read().unwrap().len()
    }

    /// All recorded audit events, oldest first.
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit_events.read().unwrap().clone()
    }
}

#[async_trait]
impl IntakeStore for MemoryStore {
    async fn recent_items(&self, limit: usize) -> Result<Vec<IntakeItem>> {
        // The backing index supports only the status predicate; everything
        // else is the caller's responsibility.
        let mut items: Vec<_> = self
            .items
            .read()
            .unwrap()
            .values()
            .filter(|i| i.status == IntakeStatus::New)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        items.truncate(limit);
        Ok(items)
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<IntakeItem>> {
        Ok(self.items.read().unwrap().get(&id).cloned())
    }

    async fn record_decision(
        &self,
        id: Uuid,
        status: IntakeStatus,
        editor_status: EditorStatus,
        decision: &EditorDecision,
    ) -> Result<()> {
        let mut items = self.items.write().unwrap();
        let item = items
            .get_mut(&id)
            .ok_or(ReviewError::ItemNotFound { id })?;
        // The editor decision is append-only: the first write wins.
        if item.editor_decision.is_some() {
            return Ok(());
        }
        item.status = status;
        item.editor_status = Some(editor_status);
        item.editor_decision = Some(decision.clone());
        Ok(())
    }
}

#[async_trait]
impl EntityDirectory for MemoryStore {
    async fn get_entity(&self, id: Uuid) -> Result<Option<Entity>> {
        Ok(self.entities.read().unwrap().get(&id).cloned())
    }

    async fn find_entity_by_normalized_name(&self, normalized: &str) -> Result<Option<Entity>> {
        let names = self.entity_names.read().unwrap();
        let Some(id) = names.get(normalized) else {
            return Ok(None);
        };
        Ok(self.entities.read().unwrap().get(id).cloned())
    }

    async fn create_entity(&self, entity: &Entity) -> Result<()> {
        self.entities
            .write()
            .unwrap()
            .insert(entity.id, entity.clone());
        self.entity_names
            .write()
            .unwrap()
            .insert(normalize_name(&entity.name), entity.id);
        Ok(())
    }
}

#[async_trait]
impl SourceRegistry for MemoryStore {
    async fn create_source(&self, source: &SourceRecord) -> Result<()> {
        self.sources
            .write()
            .unwrap()
            .insert(source.id, source.clone());
        Ok(())
    }

    async fn get_source(&self, id: Uuid) -> Result<Option<SourceRecord>> {
        Ok(self.sources.read().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn create_card(&self, card: &Card) -> Result<()> {
        self.cards.write().unwrap().insert(card.id, card.clone());
        Ok(())
    }

    async fn publish_card(&self, id: Uuid) -> Result<()> {
        // Check the source invariant before taking the card lock for writing.
        let source_refs = {
            let cards = self.cards.read().unwrap();
            let card = cards.get(&id).ok_or(ReviewError::CardNotFound { id })?;
            card.source_refs.clone()
        };
        if source_refs.is_empty() {
            return Err(ReviewError::MissingSourceRef { id });
        }
        {
            let sources = self.sources.read().unwrap();
            for source_id in &source_refs {
                match sources.get(source_id) {
                    Some(s) if s.verification_status == VerificationStatus::Verified => {}
                    Some(_) => {
                        return Err(ReviewError::UnverifiedSource {
                            card_id: id,
                            source_id: *source_id,
                        })
                    }
                    None => return Err(ReviewError::SourceNotFound { id: *source_id }),
                }
            }
        }

        let mut cards = self.cards.write().unwrap();
        let card = cards.get_mut(&id).ok_or(ReviewError::CardNotFound { id })?;
        card.status = RecordStatus::Published;
        card.published_at = Some(Utc::now());
        self.published_cards.write().unwrap().push(id);
        Ok(())
    }

    async fn get_card(&self, id: Uuid) -> Result<Option<Card>> {
        Ok(self.cards.read().unwrap().get(&id).cloned())
    }

    async fn recent_published_cards(&self, limit: usize) -> Result<Vec<Card>> {
        let order = self.published_cards.read().unwrap();
        let cards = self.cards.read().unwrap();
        Ok(order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| cards.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn create_relationship(&self, relationship: &Relationship) -> Result<()> {
        self.relationships
            .write()
            .unwrap()
            .insert(relationship.id, relationship.clone());
        self.rels_by_from
            .write()
            .unwrap()
            .entry(relationship.from_entity_id)
            .or_default()
            .push(relationship.id);
        self.rels_by_to
            .write()
            .unwrap()
            .entry(relationship.to_entity_id)
            .or_default()
            .push(relationship.id);
        Ok(())
    }

    async fn publish_relationship(&self, id: Uuid) -> Result<()> {
        let mut relationships = self.relationships.write().unwrap();
        let rel = relationships
            .get_mut(&id)
            .ok_or(ReviewError::RelationshipNotFound { id })?;
        if rel.source_refs.is_empty() {
            return Err(ReviewError::MissingSourceRef { id });
        }
        rel.status = RecordStatus::Published;
        Ok(())
    }

    async fn get_relationship(&self, id: Uuid) -> Result<Option<Relationship>> {
        Ok(self.relationships.read().unwrap().get(&id).cloned())
    }

    async fn relationships_for_entity(&self, entity_id: Uuid) -> Result<Vec<Relationship>> {
        let relationships = self.relationships.read().unwrap();
        let from_index = self.rels_by_from.read().unwrap();
        let to_index = self.rels_by_to.read().unwrap();

        let mut ids: Vec<Uuid> = Vec::new();
        if let Some(from) = from_index.get(&entity_id) {
            ids.extend(from);
        }
        if let Some(to) = to_index.get(&entity_id) {
            // Self-relationships would appear in both indexes once each
            for id in to {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
        }
        Ok(ids
            .into_iter()
            .filter_map(|id| relationships.get(&id).cloned())
            .collect())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn record_publish(&self, event: &AuditEvent) -> Result<()> {
        self.audit_events.write().unwrap().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::records::{CardCategory, EntityType, RelationshipType};

    #[tokio::test]
    async fn test_entity_lookup_by_normalized_name() {
        let store = MemoryStore::new();
        let entity = Entity::new("Acme Corp.", EntityType::Corporation);
        store.create_entity(&entity).await.unwrap();

        let hit = store
            .find_entity_by_normalized_name(&normalize_name("ACME CORP"))
            .await
            .unwrap();
        assert_eq!(hit.unwrap().id, entity.id);

        let miss = store
            .find_entity_by_normalized_name(&normalize_name("Other Org"))
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_publish_card_requires_verified_source() {
        let store = MemoryStore::new();

        let unverified = SourceRecord::new("Story", "https://example.com/a", "Example News");
        store.create_source(&unverified).await.unwrap();
        let card = Card::new("Title", "Summary", CardCategory::General).with_source(unverified.id);
        store.create_card(&card).await.unwrap();

        let err = store.publish_card(card.id).await.unwrap_err();
        assert!(matches!(err, ReviewError::UnverifiedSource { .. }));

        // A card with no source refs at all is also rejected
        let bare = Card::new("Bare", "Summary", CardCategory::General);
        store.create_card(&bare).await.unwrap();
        let err = store.publish_card(bare.id).await.unwrap_err();
        assert!(matches!(err, ReviewError::MissingSourceRef { .. }));
    }

    #[tokio::test]
    async fn test_recent_published_cards_newest_first() {
        let store = MemoryStore::new();
        let source = SourceRecord::new("S", "https://example.com", "P").verified();
        store.create_source(&source).await.unwrap();

        let mut ids = Vec::new();
        for n in 0..3 {
            let card = Card::new(format!("Card {n}"), "s", CardCategory::General)
                .with_source(source.id);
            store.create_card(&card).await.unwrap();
            store.publish_card(card.id).await.unwrap();
            ids.push(card.id);
        }

        let recent = store.recent_published_cards(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, ids[2]);
        assert_eq!(recent[1].id, ids[1]);
    }

    #[tokio::test]
    async fn test_relationships_indexed_by_both_endpoints() {
        let store = MemoryStore::new();
        let a = Entity::new("A", EntityType::Corporation);
        let b = Entity::new("B", EntityType::GovernmentAgency);
        store.create_entity(&a).await.unwrap();
        store.create_entity(&b).await.unwrap();

        let rel = Relationship::new(a.id, b.id, RelationshipType::RegulatorOf);
        store.create_relationship(&rel).await.unwrap();

        let from_side = store.relationships_for_entity(a.id).await.unwrap();
        let to_side = store.relationships_for_entity(b.id).await.unwrap();
        assert_eq!(from_side.len(), 1);
        assert_eq!(to_side.len(), 1);
        assert_eq!(from_side[0].id, to_side[0].id);
    }

    #[tokio::test]
    async fn test_editor_decision_is_append_only() {
        let store = MemoryStore::new();
        let item = IntakeItem::new("T", "P", "https://example.com");
        let id = item.id;
        store.seed_item(item);

        let first = EditorDecision {
            decision: crate::types::intake::DecisionKind::Skip,
            reason: "first".into(),
            confidence: 0.2,
            decided_at: Utc::now(),
            run_id: Uuid::new_v4(),
        };
        store
            .record_decision(id, IntakeStatus::Rejected, EditorStatus::Skipped, &first)
            .await
            .unwrap();

        let second = EditorDecision {
            reason: "second".into(),
            ..first.clone()
        };
        store
            .record_decision(id, IntakeStatus::Promoted, EditorStatus::Approved, &second)
            .await
            .unwrap();

        let item = store.get_item(id).await.unwrap().unwrap();
        assert_eq!(item.editor_decision.unwrap().reason, "first");
        assert_eq!(item.status, IntakeStatus::Rejected);
    }
}
