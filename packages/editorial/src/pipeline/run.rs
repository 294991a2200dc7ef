//! The run controller: one scheduled pass over eligible intake items.
//!
//! Items are processed strictly in sequence. A per-item failure records an
//! ERROR result and leaves the item untouched for a later run; only a run
//! where every processed item errored surfaces as a run-level failure, so
//! the invoking scheduler can alert.

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{ReviewError, Result};
use crate::pipeline::eligibility::select_eligible;
use crate::pipeline::prompts::review_template;
use crate::pipeline::publish::{publish_decision, PublishOutcome};
use crate::pipeline::review::request_decision;
use crate::traits::ai::ReviewModel;
use crate::traits::snapshot::Snapshotter;
use crate::traits::store::ReviewStore;
use crate::types::config::ReviewConfig;
use crate::types::decision::ReviewDecision;
use crate::types::intake::{DecisionKind, EditorDecision, EditorStatus, IntakeItem, IntakeStatus};
use crate::types::records::Entity;
use crate::types::run::{ItemOutcome, ItemResult, RunSummary};

/// Execute one review run.
///
/// Disabled config short-circuits to an empty summary before any store
/// access. Returns `RunFailed` only when items were processed and every one
/// of them errored.
pub async fn run_review<S, M, P>(
    store: &S,
    model: &M,
    snapshotter: &P,
    config: &ReviewConfig,
) -> Result<RunSummary>
where
    S: ReviewStore,
    M: ReviewModel,
    P: Snapshotter,
{
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();

    if !config.enabled {
        info!(%run_id, "Review pipeline disabled, skipping run");
        return Ok(RunSummary::empty(run_id, started_at, config.dry_run));
    }

    let template = review_template(config.prompt_template_path.as_deref());
    let items = select_eligible(store, config.max_items_per_run).await?;
    info!(%run_id, items = items.len(), dry_run = config.dry_run, "Starting review run");

    let mut results = Vec::with_capacity(items.len());
    for item in &items {
        let result = match process_item(store, model, snapshotter, config, template, item, run_id)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                // Item left untouched; a later run retries it
                error!(intake_id = %item.id, error = %e, "Item processing failed");
                ItemResult::error(item.id, e.to_string())
            }
        };
        results.push(result);
    }

    let processed = results.len();
    let published = count(&results, ItemOutcome::Publish);
    let skipped = count(&results, ItemOutcome::Skip);
    let errors = count(&results, ItemOutcome::Error);

    if processed > 0 && errors == processed {
        error!(%run_id, processed, "Every item in the run errored");
        return Err(ReviewError::RunFailed { run_id, processed });
    }

    info!(%run_id, processed, published, skipped, errors, "Review run complete");
    Ok(RunSummary {
        run_id,
        started_at,
        completed_at: Utc::now(),
        processed,
        published,
        skipped,
        errors,
        dry_run: config.dry_run,
        results,
    })
}

fn count(results: &[ItemResult], outcome: ItemOutcome) -> usize {
    results.iter().filter(|r| r.outcome == outcome).count()
}

/// Process a single eligible item: gather context, request a decision,
/// then either publish or record the skip.
async fn process_item<S, M, P>(
    store: &S,
    model: &M,
    snapshotter: &P,
    config: &ReviewConfig,
    template: &str,
    item: &IntakeItem,
    run_id: Uuid,
) -> Result<ItemResult>
where
    S: ReviewStore,
    M: ReviewModel,
    P: Snapshotter,
{
    let matched_entities = gather_matched_entities(store, item).await?;
    let decision =
        request_decision(model, template, item, &matched_entities, config.min_confidence).await?;

    if !decision.is_publish() {
        return terminate_skip(store, config, item, &decision, decision.reason.clone(), run_id)
            .await;
    }

    match publish_decision(store, snapshotter, item, &decision, &matched_entities, config, run_id)
        .await?
    {
        PublishOutcome::Skipped { reason } => {
            terminate_skip(store, config, item, &decision, reason, run_id).await
        }
        PublishOutcome::Published(records) => {
            if !config.dry_run {
                let editor_decision = EditorDecision {
                    decision: DecisionKind::Publish,
                    reason: decision.reason.clone(),
                    confidence: decision.confidence,
                    decided_at: Utc::now(),
                    run_id,
                };
                store
                    .record_decision(
                        item.id,
                        IntakeStatus::Promoted,
                        EditorStatus::Approved,
                        &editor_decision,
                    )
                    .await?;
            }
            Ok(shape_result(
                ItemResult {
                    intake_id: item.id,
                    outcome: ItemOutcome::Publish,
                    reason: decision.reason,
                    card_id: Some(records.card_id),
                    entity_ids: records.entity_ids,
                    relationship_ids: records.relationship_ids,
                },
                config.dry_run,
            ))
        }
    }
}

/// Terminate an item as a skip and build its result. In dry-run mode the
/// item is left untouched and the reason is tagged.
async fn terminate_skip<S: ReviewStore>(
    store: &S,
    config: &ReviewConfig,
    item: &IntakeItem,
    decision: &ReviewDecision,
    reason: String,
    run_id: Uuid,
) -> Result<ItemResult> {
    if !config.dry_run {
        let editor_decision = EditorDecision {
            decision: DecisionKind::Skip,
            reason: reason.clone(),
            confidence: decision.confidence,
            decided_at: Utc::now(),
            run_id,
        };
        store
            .record_decision(
                item.id,
                IntakeStatus::Rejected,
                EditorStatus::Skipped,
                &editor_decision,
            )
            .await?;
    }
    Ok(shape_result(ItemResult::skip(item.id, reason), config.dry_run))
}

/// Dry-run results carry no record ids (nothing was written; simulated ids
/// would dangle) and tag the reason so downstream reporting can tell runs
/// apart.
fn shape_result(mut result: ItemResult, dry_run: bool) -> ItemResult {
    if dry_run {
        result.reason = format!("[dry run] {}", result.reason);
        result.card_id = None;
        result.entity_ids.clear();
        result.relationship_ids.clear();
    }
    result
}

/// Collect directory entities the item's suggestions already point at:
/// explicit pre-matched ids first, then normalized-name hits, deduplicated.
/// These become the `matchedIndex` context in the prompt.
async fn gather_matched_entities<S: ReviewStore>(
    store: &S,
    item: &IntakeItem,
) -> Result<Vec<Entity>> {
    let mut matched: Vec<Entity> = Vec::new();

    for suggestion in &item.suggested_entities {
        let found = if let Some(id) = suggestion.matched_entity_id {
            let entity = store.get_entity(id).await?;
            if entity.is_none() {
                warn!(%id, name = %suggestion.name, "Suggested match points at unknown entity");
            }
            entity
        } else {
            let normalized = crate::types::records::normalize_name(&suggestion.name);
            if normalized.is_empty() {
                None
            } else {
                store.find_entity_by_normalized_name(&normalized).await?
            }
        };

        if let Some(entity) = found {
            if !matched.iter().any(|e| e.id == entity.id) {
                matched.push(entity);
            }
        }
    }

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::MemoryStore;
    use crate::testing::{MockReviewModel, MockSnapshotter};
    use crate::traits::store::{EntityDirectory, IntakeStore};
    use crate::types::intake::SuggestedEntity;
    use crate::types::records::EntityType;

    fn acme_item() -> IntakeItem {
        IntakeItem::new(
            "Acme Corp fined $2M by EPA",
            "The Ledger",
            "https://ledger.example/acme-epa",
        )
        .with_extraction(
            "The EPA fined Acme Corp $2M for emissions violations.",
            [SuggestedEntity::new("Acme Corp", "CORPORATION", 0.9)],
        )
    }

    const ACME_PUBLISH: &str = r#"{
        "decision": "PUBLISH",
        "reason": "Concrete enforcement action from a named regulator",
        "confidence": 0.92,
        "category": "REGULATORY",
        "entities": [
            {"create": {"name": "Acme Corp", "type": "CORPORATION"}},
            {"create": {"name": "EPA", "type": "GOVERNMENT_AGENCY"}}
        ],
        "relationships": [
            {"fromEntityIndex": 1, "toEntityIndex": 0, "type": "FINED", "description": "EPA fined Acme $2M"}
        ],
        "cardSummary": "The EPA fined Acme Corp $2M over emissions violations."
    }"#;

    #[tokio::test]
    async fn test_disabled_config_is_a_no_op() {
        let store = MemoryStore::new();
        store.seed_item(acme_item());
        let model = MockReviewModel::new();
        let config = ReviewConfig::default().disabled();

        let summary = run_review(&store, &model, &MockSnapshotter::new(), &config)
            .await
            .unwrap();
        assert_eq!(summary.processed, 0);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_publish_end_to_end() {
        let store = MemoryStore::new();
        let item = acme_item();
        let item_id = item.id;
        store.seed_item(item);
        let model = MockReviewModel::new().with_response("Acme", ACME_PUBLISH);

        let summary = run_review(&store, &model, &MockSnapshotter::new(), &ReviewConfig::default())
            .await
            .unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.published, 1);

        let result = &summary.results[0];
        assert_eq!(result.outcome, ItemOutcome::Publish);
        assert!(result.card_id.is_some());
        assert_eq!(result.entity_ids.len(), 2);
        assert_eq!(result.relationship_ids.len(), 1);

        let item = store.get_item(item_id).await.unwrap().unwrap();
        assert_eq!(item.status, IntakeStatus::Promoted);
        assert_eq!(item.editor_status, Some(EditorStatus::Approved));
        let decision = item.editor_decision.unwrap();
        assert_eq!(decision.decision, DecisionKind::Publish);
        assert_eq!(decision.run_id, summary.run_id);
        assert_eq!(store.audit_events().len(), 1);
    }

    #[tokio::test]
    async fn test_skip_terminates_item() {
        let store = MemoryStore::new();
        let item = acme_item();
        let item_id = item.id;
        store.seed_item(item);
        let model = MockReviewModel::new()
            .with_response("Acme", r#"{"decision": "SKIP", "reason": "Opinion piece"}"#);

        let summary = run_review(&store, &model, &MockSnapshotter::new(), &ReviewConfig::default())
            .await
            .unwrap();
        assert_eq!(summary.skipped, 1);

        let item = store.get_item(item_id).await.unwrap().unwrap();
        assert_eq!(item.status, IntakeStatus::Rejected);
        assert_eq!(item.editor_status, Some(EditorStatus::Skipped));
        assert_eq!(item.editor_decision.unwrap().reason, "Opinion piece");
        assert_eq!(store.card_count(), 0);
    }

    #[tokio::test]
    async fn test_low_confidence_publish_becomes_skip() {
        let store = MemoryStore::new();
        store.seed_item(acme_item());
        let model = MockReviewModel::new().with_response(
            "Acme",
            r#"{"decision": "PUBLISH", "reason": "r", "confidence": 0.79,
                "entities": [{"create": {"name": "Acme Corp", "type": "CORPORATION"}}]}"#,
        );

        let summary = run_review(&store, &model, &MockSnapshotter::new(), &ReviewConfig::default())
            .await
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(summary.results[0].reason.contains("0.79"));
        assert_eq!(store.card_count(), 0);
    }

    #[tokio::test]
    async fn test_terminated_item_is_not_reprocessed() {
        let store = MemoryStore::new();
        store.seed_item(acme_item());
        let model = MockReviewModel::new().with_response("Acme", ACME_PUBLISH);
        let config = ReviewConfig::default();

        let first = run_review(&store, &model, &MockSnapshotter::new(), &config)
            .await
            .unwrap();
        assert_eq!(first.published, 1);

        // The item was terminated; a replayed run finds nothing eligible
        let second = run_review(&store, &model, &MockSnapshotter::new(), &config)
            .await
            .unwrap();
        assert_eq!(second.processed, 0);
        assert_eq!(model.call_count(), 1);
        assert_eq!(store.card_count(), 1);
    }

    #[tokio::test]
    async fn test_same_story_from_second_outlet_is_deduplicated() {
        let store = MemoryStore::new();
        store.seed_item(acme_item());
        let model = MockReviewModel::new().with_response("Acme", ACME_PUBLISH);
        let config = ReviewConfig::default();

        run_review(&store, &model, &MockSnapshotter::new(), &config)
            .await
            .unwrap();

        let rerun_item = IntakeItem::new(
            "Acme Corp fined $2M by EPA",
            "Wire Service",
            "https://wire.example/acme",
        )
        .with_extraction(
            "The EPA fined Acme Corp $2M.",
            [SuggestedEntity::new("Acme Corp", "CORPORATION", 0.9)],
        );
        let rerun_id = rerun_item.id;
        store.seed_item(rerun_item);

        let summary = run_review(&store, &model, &MockSnapshotter::new(), &config)
            .await
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.results[0].reason, "Duplicate card detected");
        let item = store.get_item(rerun_id).await.unwrap().unwrap();
        assert_eq!(item.status, IntakeStatus::Rejected);
        assert_eq!(store.card_count(), 1);
    }

    #[tokio::test]
    async fn test_error_leaves_item_for_retry() {
        let store = MemoryStore::new();
        let failing = acme_item();
        let failing_id = failing.id;
        store.seed_item(failing);
        let healthy = IntakeItem::new("Globex merger", "The Ledger", "https://ledger.example/g")
            .with_extraction(
                "Globex announced a merger.",
                [SuggestedEntity::new("Globex", "CORPORATION", 0.8)],
            );
        store.seed_item(healthy);
        let model = MockReviewModel::new()
            .failing_for("Acme")
            .with_response("Globex", r#"{"decision": "SKIP", "reason": "Routine announcement"}"#);

        let summary = run_review(&store, &model, &MockSnapshotter::new(), &ReviewConfig::default())
            .await
            .unwrap();
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.skipped, 1);

        let item = store.get_item(failing_id).await.unwrap().unwrap();
        assert_eq!(item.status, IntakeStatus::New);
        assert!(item.editor_decision.is_none());
    }

    #[tokio::test]
    async fn test_all_items_erroring_fails_the_run() {
        let store = MemoryStore::new();
        store.seed_item(acme_item());
        let model = MockReviewModel::new().failing_for("Acme");

        let err = run_review(&store, &model, &MockSnapshotter::new(), &ReviewConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::RunFailed { processed: 1, .. }));
    }

    #[tokio::test]
    async fn test_unparseable_response_is_an_error_outcome() {
        let store = MemoryStore::new();
        let item = acme_item();
        let item_id = item.id;
        store.seed_item(item);
        let healthy = IntakeItem::new("Globex merger", "The Ledger", "https://ledger.example/g")
            .with_extraction(
                "Globex announced a merger.",
                [SuggestedEntity::new("Globex", "CORPORATION", 0.8)],
            );
        store.seed_item(healthy);
        let model = MockReviewModel::new()
            .with_response("Acme", "I would publish this one, probably.")
            .with_response("Globex", r#"{"decision": "SKIP", "reason": "r"}"#);

        let summary = run_review(&store, &model, &MockSnapshotter::new(), &ReviewConfig::default())
            .await
            .unwrap();
        assert_eq!(summary.errors, 1);
        let item = store.get_item(item_id).await.unwrap().unwrap();
        assert_eq!(item.status, IntakeStatus::New);
    }

    #[tokio::test]
    async fn test_dry_run_decides_but_writes_nothing() {
        let store = MemoryStore::new();
        let item = acme_item();
        let item_id = item.id;
        store.seed_item(item);
        let model = MockReviewModel::new().with_response("Acme", ACME_PUBLISH);
        let config = ReviewConfig::default().dry_run();

        let summary = run_review(&store, &model, &MockSnapshotter::new(), &config)
            .await
            .unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.published, 1);
        let result = &summary.results[0];
        assert!(result.reason.starts_with("[dry run]"));
        assert!(result.card_id.is_none());
        assert!(result.entity_ids.is_empty());

        let item = store.get_item(item_id).await.unwrap().unwrap();
        assert_eq!(item.status, IntakeStatus::New);
        assert_eq!(store.card_count(), 0);
        assert_eq!(store.entity_count(), 0);
        assert!(store.audit_events().is_empty());
    }

    #[tokio::test]
    async fn test_matched_context_reaches_the_prompt() {
        let store = MemoryStore::new();
        let acme = crate::types::records::Entity::new("Acme Corp", EntityType::Corporation);
        store.create_entity(&acme).await.unwrap();
        store.seed_item(acme_item());
        let model = MockReviewModel::new();

        run_review(&store, &model, &MockSnapshotter::new(), &ReviewConfig::default())
            .await
            .unwrap();
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains(&acme.id.to_string()));
    }
}
