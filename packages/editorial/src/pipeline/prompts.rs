//! The editorial review prompt.
//!
//! The template is process-wide state: loaded at most once per process
//! lifetime (from `ReviewConfig::prompt_template_path` when set, else the
//! built-in constant) and shared read-only across runs. The template source
//! only changes between deployments, so there is no invalidation.

use std::path::Path;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::types::intake::IntakeItem;
use crate::types::records::Entity;

/// Built-in review prompt.
pub const REVIEW_PROMPT: &str = r#"You are an editorial reviewer for a public accountability database of sourced claims about organizations.

Decide whether this news item warrants becoming a public, sourced claim record ("card"). Publish only items that make a concrete, verifiable claim about a named organization, backed by the cited source. Skip opinion pieces, speculation, routine announcements, and items whose entities cannot be identified.

## Item under review
Title: {title}
Publisher: {publisher}
Published: {published_at}
URL: {url}

Summary:
{summary}

## Suggested entities (from extraction)
{suggested_entities}

## Suggested relationships (from extraction)
{suggested_relationships}

## Entities already matched in the directory
Reference these by index with {"matchedIndex": N}. Do not re-create them.
{matched_entities}

## Entity references
Each entry in "entities" must be exactly one of:
- {"matchedIndex": 0} — an entity from the matched list above
- {"entityId": "..."} — an explicit directory identifier you are certain of
- {"create": {"name": "...", "type": "CORPORATION|GOVERNMENT_AGENCY|NONPROFIT|PERSON|ORGANIZATION"}} — only as a last resort

## Relationships
Each entry references entities by index into YOUR "entities" array:
{"fromEntityIndex": 0, "toEntityIndex": 1, "type": "SUBSIDIARY_OF|OWNER_OF|PARTNER_OF|REGULATOR_OF|LITIGANT_AGAINST|SUPPLIER_TO|ASSOCIATED_WITH", "description": "..."}

## Output
Respond with a single JSON object and nothing else:
{
    "decision": "PUBLISH" | "SKIP",
    "reason": "one or two sentences",
    "confidence": 0.0 to 1.0,
    "category": "REGULATORY|LEGAL|ENVIRONMENTAL|LABOR|FINANCIAL|GOVERNANCE|GENERAL",
    "entities": [...],
    "relationships": [...],
    "cardSummary": "neutral, past-tense summary of the claim for the public card"
}"#;

static TEMPLATE: OnceLock<String> = OnceLock::new();

/// The review template for this process.
///
/// Loaded once; a read failure on a configured path logs a warning and falls
/// back to the built-in template rather than failing the run.
pub fn review_template(path: Option<&Path>) -> &'static str {
    TEMPLATE.get_or_init(|| match path {
        Some(p) => std::fs::read_to_string(p).unwrap_or_else(|e| {
            warn!(path = %p.display(), error = %e, "Failed to read prompt template, using built-in");
            REVIEW_PROMPT.to_string()
        }),
        None => REVIEW_PROMPT.to_string(),
    })
}

/// Matched-entity context as shown to the model; indexes here are what
/// `{"matchedIndex": N}` references resolve against.
#[derive(Debug, Serialize)]
struct MatchedEntityContext<'a> {
    index: usize,
    entity_id: &'a uuid::Uuid,
    name: &'a str,
    entity_type: &'a crate::types::records::EntityType,
}

/// Render the review prompt for an item.
pub fn format_review_prompt(
    template: &str,
    item: &IntakeItem,
    matched_entities: &[Entity],
) -> Result<String> {
    let suggested_entities = serde_json::to_string_pretty(&item.suggested_entities)?;
    let suggested_relationships = serde_json::to_string_pretty(&item.suggested_relationships)?;

    let matched: Vec<MatchedEntityContext> = matched_entities
        .iter()
        .enumerate()
        .map(|(index, e)| MatchedEntityContext {
            index,
            entity_id: &e.id,
            name: &e.name,
            entity_type: &e.entity_type,
        })
        .collect();
    let matched_json = serde_json::to_string_pretty(&matched)?;

    Ok(template
        .replace("{title}", &item.title)
        .replace("{publisher}", &item.publisher)
        .replace("{published_at}", &item.published_at.to_rfc3339())
        .replace("{url}", &item.canonical_url)
        .replace("{summary}", &item.summary)
        .replace("{suggested_entities}", &suggested_entities)
        .replace("{suggested_relationships}", &suggested_relationships)
        .replace("{matched_entities}", &matched_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::intake::SuggestedEntity;
    use crate::types::records::EntityType;

    #[test]
    fn test_format_review_prompt_substitutes_fields() {
        let item = IntakeItem::new("FTC Fines Acme", "Wire Service", "https://example.com/a")
            .with_extraction(
                "The FTC fined Acme.",
                [SuggestedEntity::new("Acme Corp", "CORPORATION", 0.9)],
            );
        let matched = vec![Entity::new("Acme Corp", EntityType::Corporation)];

        let prompt = format_review_prompt(REVIEW_PROMPT, &item, &matched).unwrap();
        assert!(prompt.contains("FTC Fines Acme"));
        assert!(prompt.contains("Wire Service"));
        assert!(prompt.contains("The FTC fined Acme."));
        assert!(prompt.contains("\"name\": \"Acme Corp\""));
        assert!(!prompt.contains("{title}"));
    }

    #[test]
    fn test_template_loads_builtin_without_path() {
        let template = review_template(None);
        assert!(template.contains("{title}"));
    }
}
