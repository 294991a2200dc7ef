//! Decision requester: response validation and the confidence gate.
//!
//! The LLM response is untrusted text. It crosses exactly one
//! parse-and-validate boundary here, producing either a typed
//! [`ReviewDecision`] or an `InvalidResponse` error — partially-trusted
//! fields never escape this module.

use serde::Deserialize;
use tracing::warn;

use crate::error::{ReviewError, Result};
use crate::pipeline::prompts::format_review_prompt;
use crate::traits::ai::ReviewModel;
use crate::types::decision::{EntityRef, RelationshipSpec, ReviewDecision};
use crate::types::intake::{DecisionKind, IntakeItem};
use crate::types::records::Entity;

const DEFAULT_REASON: &str = "No reason provided";

/// Raw wire response, before validation. Stays private to this module.
#[derive(Debug, Deserialize)]
struct RawReviewResponse {
    decision: Option<String>,
    reason: Option<String>,
    confidence: Option<f64>,
    category: Option<String>,
    #[serde(default)]
    entities: Vec<RawEntityRef>,
    #[serde(default)]
    relationships: Vec<RawRelationshipSpec>,
    #[serde(rename = "cardSummary")]
    card_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntityRef {
    Matched {
        #[serde(rename = "matchedIndex")]
        matched_index: usize,
    },
    Existing {
        #[serde(rename = "entityId")]
        entity_id: String,
    },
    Create { create: RawCreateEntity },
}

#[derive(Debug, Deserialize)]
struct RawCreateEntity {
    name: String,
    #[serde(rename = "type")]
    entity_type: String,
}

#[derive(Debug, Deserialize)]
struct RawRelationshipSpec {
    #[serde(rename = "fromEntityIndex")]
    from_entity_index: i64,
    #[serde(rename = "toEntityIndex")]
    to_entity_index: i64,
    #[serde(rename = "type")]
    relationship_type: Option<String>,
    description: Option<String>,
}

/// Clamp a raw confidence value into [0, 1]. Non-finite input maps to 0.
pub fn clamp_confidence(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Drop Markdown code-fence lines so fenced responses parse like bare ones.
fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Locate the first top-level JSON object by brace matching, string- and
/// escape-aware. Returns the object slice, including surrounding prose cut
/// away.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse and validate a raw model response into a [`ReviewDecision`].
///
/// Rejects anything without a `decision` field equal to `PUBLISH` or `SKIP`.
/// Missing optional fields take their documented defaults; confidence is
/// clamped to [0, 1] regardless of the raw value.
pub fn parse_review_response(raw: &str) -> Result<ReviewDecision> {
    let stripped = strip_code_fences(raw);
    let json = extract_json_object(&stripped)
        .ok_or_else(|| ReviewError::InvalidResponse("no JSON object found".into()))?;

    let response: RawReviewResponse = serde_json::from_str(json)
        .map_err(|e| ReviewError::InvalidResponse(format!("malformed JSON: {e}")))?;

    let decision = match response.decision.as_deref() {
        Some("PUBLISH") => DecisionKind::Publish,
        Some("SKIP") => DecisionKind::Skip,
        Some(other) => {
            return Err(ReviewError::InvalidResponse(format!(
                "unrecognized decision value: {other:?}"
            )))
        }
        None => {
            return Err(ReviewError::InvalidResponse(
                "missing decision field".into(),
            ))
        }
    };

    let entities = response
        .entities
        .into_iter()
        .map(|raw| match raw {
            RawEntityRef::Matched { matched_index } => EntityRef::Matched {
                index: matched_index,
            },
            RawEntityRef::Existing { entity_id } => EntityRef::Existing { entity_id },
            RawEntityRef::Create { create } => EntityRef::Create {
                name: create.name,
                entity_type: create.entity_type,
            },
        })
        .collect();

    let relationships = response
        .relationships
        .into_iter()
        .filter_map(|raw| {
            let (Ok(from_index), Ok(to_index)) = (
                usize::try_from(raw.from_entity_index),
                usize::try_from(raw.to_entity_index),
            ) else {
                warn!(
                    from = raw.from_entity_index,
                    to = raw.to_entity_index,
                    "Dropping relationship with negative entity index"
                );
                return None;
            };
            Some(RelationshipSpec {
                from_index,
                to_index,
                relationship_type: raw.relationship_type.unwrap_or_default(),
                description: raw.description,
            })
        })
        .collect();

    Ok(ReviewDecision {
        decision,
        reason: response.reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
        confidence: clamp_confidence(response.confidence.unwrap_or(0.0)),
        category: response.category,
        entities,
        relationships,
        card_summary: response.card_summary.unwrap_or_default(),
    })
}

/// The confidence gate: a PUBLISH below `min_confidence` is downgraded in
/// place to SKIP. A hard business rule — no publish proceeds below threshold.
pub fn apply_confidence_gate(decision: &mut ReviewDecision, min_confidence: f64) {
    if decision.is_publish() && decision.confidence < min_confidence {
        decision.decision = DecisionKind::Skip;
        decision.reason = format!(
            "Confidence {:.2} below threshold {:.2}",
            decision.confidence, min_confidence
        );
    }
}

/// Render the prompt, invoke the model once, and validate the response.
///
/// Transport failures and unparseable responses both surface as errors —
/// the caller records them as ERROR outcomes, distinguishable from SKIP in
/// the audit trail.
pub async fn request_decision<M: ReviewModel>(
    model: &M,
    template: &str,
    item: &IntakeItem,
    matched_entities: &[Entity],
    min_confidence: f64,
) -> Result<ReviewDecision> {
    let prompt = format_review_prompt(template, item, matched_entities)?;
    let raw = model.review(&prompt).await?;
    let mut decision = parse_review_response(&raw)?;
    apply_confidence_gate(&mut decision, min_confidence);
    Ok(decision)
}
