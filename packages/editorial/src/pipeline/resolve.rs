//! Entity resolution: decision entity references to directory entities.
//!
//! Resolution prefers reuse over creation: a `create` reference is still
//! checked against the directory by normalized name before a new entity is
//! written. Invalid references are dropped with a warning rather than
//! failing the item; storage failures propagate.

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::traits::store::EntityDirectory;
use crate::types::decision::EntityRef;
use crate::types::records::{normalize_name, Entity, EntityType};

/// The outcome of resolving one decision's entity references, in reference
/// order. The list is deliberately NOT de-duplicated: relationship specs
/// index into the decision's entities array by position, so every surviving
/// reference keeps its slot even when two references name the same entity.
#[derive(Debug, Clone, Default)]
pub struct ResolvedEntities {
    pub entities: Vec<Entity>,
    /// Ids of entities created (or simulated, in dry-run) by this resolution
    pub created_ids: Vec<Uuid>,
}

impl ResolvedEntities {
    pub fn ids(&self) -> Vec<Uuid> {
        self.entities.iter().map(|e| e.id).collect()
    }
}

/// Resolve every entity reference in a decision against the directory.
///
/// `matched_entities` is the pre-matched context list the decision's
/// `matched` indexes point into. In dry-run mode, `create` references
/// produce in-memory entities without directory writes.
pub async fn resolve_entities<S: EntityDirectory>(
    store: &S,
    refs: &[EntityRef],
    matched_entities: &[Entity],
    dry_run: bool,
) -> Result<ResolvedEntities> {
    let mut resolved = ResolvedEntities::default();

    for entity_ref in refs {
        match entity_ref {
            EntityRef::Matched { index } => match matched_entities.get(*index) {
                Some(entity) => resolved.entities.push(entity.clone()),
                None => {
                    warn!(
                        index,
                        available = matched_entities.len(),
                        "Dropping matched entity reference with out-of-range index"
                    );
                }
            },
            EntityRef::Existing { entity_id } => {
                let Ok(id) = Uuid::parse_str(entity_id) else {
                    warn!(entity_id = %entity_id, "Dropping entity reference with malformed id");
                    continue;
                };
                match store.get_entity(id).await? {
                    Some(entity) => resolved.entities.push(entity),
                    None => {
                        warn!(%id, "Dropping entity reference to unknown entity");
                    }
                }
            }
            EntityRef::Create { name, entity_type } => {
                let normalized = normalize_name(name);
                if normalized.is_empty() {
                    warn!(name = %name, "Dropping create reference with empty normalized name");
                    continue;
                }
                if let Some(existing) = store.find_entity_by_normalized_name(&normalized).await? {
                    info!(name = %name, entity_id = %existing.id, "Create reference matched existing entity");
                    resolved.entities.push(existing);
                    continue;
                }
                let entity = Entity::new(name.clone(), EntityType::from_free_text(entity_type));
                if !dry_run {
                    store.create_entity(&entity).await?;
                    info!(name = %name, entity_id = %entity.id, "Created entity");
                }
                resolved.created_ids.push(entity.id);
                resolved.entities.push(entity);
            }
        }
    }

    Ok(resolved)
}
