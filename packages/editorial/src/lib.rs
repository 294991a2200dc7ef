//! LLM-Assisted Editorial Review Library
//!
//! A publication pipeline that turns ingested news items into sourced,
//! public claim records ("cards") about organizations, with an LLM making
//! the per-item editorial call behind a strict validation boundary.
//!
//! # Design Philosophy
//!
//! **"The model proposes, the pipeline disposes"**
//!
//! - The LLM response is untrusted text until it survives parse-and-validate
//! - Hard business rules (confidence gate, verified-source invariant,
//!   duplicate window) override whatever the model said
//! - Per-item failure never poisons the run; errored items stay eligible
//! - Library handles mechanics, storage and model live behind traits
//!
//! # Usage
//!
//! ```rust,ignore
//! use editorial::{run_review, MemoryStore, ReviewConfig};
//! use editorial::testing::{MockReviewModel, MockSnapshotter};
//!
//! let store = MemoryStore::new();
//! let model = MockReviewModel::new();
//! let snapshotter = MockSnapshotter::new();
//!
//! let summary = run_review(&store, &model, &snapshotter, &ReviewConfig::default()).await?;
//! println!("published {} of {}", summary.published, summary.processed);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (ReviewModel, Snapshotter, storage)
//! - [`types`] - Domain data types (items, entities, cards, relationships)
//! - [`pipeline`] - The review pipeline, stage by stage
//! - [`stores`] - Storage implementations (MemoryStore)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{Result, ReviewError};
pub use traits::{
    ai::ReviewModel,
    snapshot::{hash_content, Snapshot, Snapshotter},
    store::{
        AuditLog, CardStore, EntityDirectory, IntakeStore, RelationshipStore, ReviewStore,
        SourceRegistry,
    },
};
pub use types::{
    config::ReviewConfig,
    decision::{EntityRef, RelationshipSpec, ReviewDecision},
    intake::{
        DecisionKind, EditorDecision, EditorStatus, ExtractionStatus, IntakeItem, IntakeStatus,
        SuggestedEntity, SuggestedRelationship,
    },
    records::{
        normalize_name, Card, CardCategory, DocType, Entity, EntityType, RecordStatus,
        Relationship, RelationshipType, SourceRecord, VerificationStatus,
    },
    run::{AuditEvent, ItemOutcome, ItemResult, RunSummary},
};

// Re-export pipeline components
pub use pipeline::{
    dedup::{find_duplicate, normalize_title},
    eligibility::{is_eligible, select_eligible},
    prompts::{format_review_prompt, review_template, REVIEW_PROMPT},
    publish::{publish_decision, PublishOutcome, PublishedRecords},
    resolve::{resolve_entities, ResolvedEntities},
    review::{apply_confidence_gate, clamp_confidence, parse_review_response, request_decision},
    run::run_review,
};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "openai")]
pub use ai::OpenAI;
