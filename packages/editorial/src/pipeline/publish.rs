//! Publication: turn a validated PUBLISH decision into durable records.
//!
//! The store offers no multi-record commit, so publication is ordered to
//! degrade safely: entities and the source land before the card, the card
//! before its relationships, and the audit event last. A failure partway
//! leaves draft records behind, never a published card without a verified
//! source. Once creation succeeds, publish failures (card or relationship)
//! are logged and tolerated; the item is still reported as published so it
//! is not re-processed and re-created by the next run.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::pipeline::dedup::find_duplicate;
use crate::pipeline::resolve::resolve_entities;
use crate::traits::snapshot::Snapshotter;
use crate::traits::store::ReviewStore;
use crate::types::config::ReviewConfig;
use crate::types::decision::ReviewDecision;
use crate::types::intake::IntakeItem;
use crate::types::records::{
    Card, CardCategory, Entity, Relationship, RelationshipType, SourceRecord,
};
use crate::types::run::AuditEvent;

/// Identifiers of everything a successful publication produced.
#[derive(Debug, Clone)]
pub struct PublishedRecords {
    pub card_id: Uuid,
    pub source_id: Uuid,
    pub entity_ids: Vec<Uuid>,
    pub relationship_ids: Vec<Uuid>,
}

/// Outcome of attempting to publish a decision. Business-rule refusals
/// (no entities, duplicate) come back as `Skipped`, not errors.
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    Published(PublishedRecords),
    Skipped { reason: String },
}

/// Execute a PUBLISH decision end to end.
///
/// In dry-run mode all lookups run but nothing is written; the returned
/// record ids are simulated.
pub async fn publish_decision<S: ReviewStore, P: Snapshotter>(
    store: &S,
    snapshotter: &P,
    item: &IntakeItem,
    decision: &ReviewDecision,
    matched_entities: &[Entity],
    config: &ReviewConfig,
    run_id: Uuid,
) -> Result<PublishOutcome> {
    let resolved = resolve_entities(store, &decision.entities, matched_entities, config.dry_run)
        .await?;
    if resolved.entities.is_empty() {
        return Ok(PublishOutcome::Skipped {
            reason: "No entities could be resolved".into(),
        });
    }
    let entity_ids = resolved.ids();

    // The matched card id is in the duplicate detector's log; the recorded
    // reason stays the fixed string.
    if find_duplicate(store, &item.title, &entity_ids, config.dedup_window)
        .await?
        .is_some()
    {
        return Ok(PublishOutcome::Skipped {
            reason: "Duplicate card detected".into(),
        });
    }

    let source = build_source(snapshotter, item).await;
    if !config.dry_run {
        store.create_source(&source).await?;
    }

    let summary = if decision.card_summary.trim().is_empty() {
        item.summary.clone()
    } else {
        decision.card_summary.clone()
    };
    let category = decision
        .category
        .as_deref()
        .map(CardCategory::from_free_text)
        .unwrap_or(CardCategory::General);
    let card = Card::new(&item.title, summary, category)
        .with_entities(entity_ids.iter().copied())
        .with_source(source.id);

    if !config.dry_run {
        store.create_card(&card).await?;
        // Publish failure after a successful create is non-fatal: the card
        // stays DRAFT for manual follow-up and the item still terminates.
        match store.publish_card(card.id).await {
            Ok(()) => {
                info!(card_id = %card.id, title = %item.title, "Published card")
            }
            Err(e) => {
                warn!(card_id = %card.id, error = %e, "Card publish failed; left in draft")
            }
        }
    } else {
        info!(card_id = %card.id, title = %item.title, dry_run = true, "Published card");
    }

    let relationship_ids =
        publish_relationships(store, decision, &resolved.entities, source.id, config.dry_run)
            .await;

    if !config.dry_run {
        let event = AuditEvent {
            card_id: card.id,
            source_id: source.id,
            entity_ids: entity_ids.clone(),
            relationship_ids: relationship_ids.clone(),
            confidence: decision.confidence,
            run_id,
            automated: true,
            occurred_at: Utc::now(),
        };
        store.record_publish(&event).await?;
    }

    Ok(PublishOutcome::Published(PublishedRecords {
        card_id: card.id,
        source_id: source.id,
        entity_ids,
        relationship_ids,
    }))
}

/// Build the citable source record for an item, snapshotting its canonical
/// URL. Verification does not depend on the snapshot: a capture failure is
/// logged and the source ships without a hash.
async fn build_source<P: Snapshotter>(snapshotter: &P, item: &IntakeItem) -> SourceRecord {
    let source = SourceRecord::new(&item.title, &item.canonical_url, &item.publisher).verified();
    match snapshotter.capture(&item.canonical_url).await {
        Ok(snapshot) => source.with_snapshot_hash(snapshot.content_hash),
        Err(e) => {
            warn!(url = %item.canonical_url, error = %e, "Snapshot capture failed; source kept without hash");
            source
        }
    }
}

/// Create and publish the decision's relationships. Invalid index pairs are
/// dropped with a warning; a storage failure on one relationship does not
/// abort the rest.
async fn publish_relationships<S: ReviewStore>(
    store: &S,
    decision: &ReviewDecision,
    entities: &[Entity],
    source_id: Uuid,
    dry_run: bool,
) -> Vec<Uuid> {
    let mut relationship_ids = Vec::new();

    for spec in &decision.relationships {
        let (Some(from), Some(to)) = (entities.get(spec.from_index), entities.get(spec.to_index))
        else {
            warn!(
                from = spec.from_index,
                to = spec.to_index,
                resolved = entities.len(),
                "Dropping relationship with out-of-range entity index"
            );
            continue;
        };

        let mut relationship = Relationship::new(
            from.id,
            to.id,
            RelationshipType::from_free_text(&spec.relationship_type),
        )
        .with_source(source_id);
        if let Some(description) = &spec.description {
            relationship = relationship.with_description(description);
        }

        if !dry_run {
            if let Err(e) = store.create_relationship(&relationship).await {
                warn!(error = %e, "Relationship create failed; continuing");
                continue;
            }
            if let Err(e) = store.publish_relationship(relationship.id).await {
                warn!(relationship_id = %relationship.id, error = %e, "Relationship publish failed; left in draft");
                continue;
            }
        }
        relationship_ids.push(relationship.id);
    }

    relationship_ids
}
