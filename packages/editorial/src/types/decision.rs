//! Validated review decisions.
//!
//! These types only ever come out of the parse-and-validate boundary in
//! `pipeline::review` — raw LLM output never crosses into the rest of the
//! pipeline.

use serde::{Deserialize, Serialize};

use crate::types::intake::DecisionKind;

/// One of the three ways a decision can reference an entity.
///
/// Modeled as a sum type so resolution is an exhaustive match — adding a
/// fourth variant is a compile-time concern for every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityRef {
    /// Index into the pre-matched entity context shown to the model
    Matched { index: usize },
    /// Explicit directory identifier, validated at resolution time
    Existing { entity_id: String },
    /// Create a new entity as a last resort (dedup-checked first)
    Create { name: String, entity_type: String },
}

/// A decision-supplied relationship between two resolved entities,
/// referenced by index into the resolved entity list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSpec {
    pub from_index: usize,
    pub to_index: usize,
    /// Free text, mapped onto the fixed vocabulary at publication time
    pub relationship_type: String,
    pub description: Option<String>,
}

/// A validated, normalized review decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub decision: DecisionKind,
    pub reason: String,
    /// Always within [0, 1]
    pub confidence: f64,
    pub category: Option<String>,
    pub entities: Vec<EntityRef>,
    pub relationships: Vec<RelationshipSpec>,
    pub card_summary: String,
}

impl ReviewDecision {
    /// A skip decision with the given reason, used when a business rule
    /// overrides whatever the model said.
    pub fn skip(reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            decision: DecisionKind::Skip,
            reason: reason.into(),
            confidence,
            category: None,
            entities: Vec::new(),
            relationships: Vec::new(),
            card_summary: String::new(),
        }
    }

    pub fn is_publish(&self) -> bool {
        self.decision == DecisionKind::Publish
    }
}
