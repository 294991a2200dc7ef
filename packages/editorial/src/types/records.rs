//! Durable records: entities, sources, cards, and relationships.
//!
//! Free-text type strings from the LLM are mapped onto the fixed vocabularies
//! here through total lookup tables with a guaranteed default arm — unknown
//! input never propagates unmapped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed entity-type vocabulary. `Organization` is the most general category
/// and the default arm for unrecognized free-text types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Corporation,
    GovernmentAgency,
    Nonprofit,
    Person,
    Organization,
}

impl EntityType {
    /// Map a free-text type guess onto the fixed vocabulary.
    pub fn from_free_text(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "CORPORATION" | "COMPANY" | "CORP" | "BUSINESS" => Self::Corporation,
            "GOVERNMENT_AGENCY" | "GOVERNMENT AGENCY" | "AGENCY" | "REGULATOR"
            | "GOVERNMENT" => Self::GovernmentAgency,
            "NONPROFIT" | "NON-PROFIT" | "NGO" | "CHARITY" => Self::Nonprofit,
            "PERSON" | "INDIVIDUAL" => Self::Person,
            _ => Self::Organization,
        }
    }
}

/// An organization or individual referenced by claims and relationships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub name: String,
    pub entity_type: EntityType,
    pub aliases: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity {
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            entity_type,
            aliases: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// Normalize an entity name for duplicate matching: lowercase, punctuation
/// stripped, whitespace collapsed. Matching on this is the only uniqueness
/// enforcement — near-duplicates can coexist when normalization misses them.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_space = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Document type of a citable source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    NewsArticle,
    PressRelease,
    Filing,
    WebPage,
}

/// Whether a source has been verified for citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Unverified,
    Verified,
}

/// A citable source record tied to a retrieved document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub publisher: String,
    pub doc_type: DocType,
    pub verification_status: VerificationStatus,
    /// SHA-256 of the captured snapshot, when one was taken
    pub snapshot_hash: Option<String>,
    pub retrieved_at: DateTime<Utc>,
}

impl SourceRecord {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        publisher: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            url: url.into(),
            publisher: publisher.into(),
            doc_type: DocType::NewsArticle,
            verification_status: VerificationStatus::Unverified,
            snapshot_hash: None,
            retrieved_at: Utc::now(),
        }
    }

    pub fn with_doc_type(mut self, doc_type: DocType) -> Self {
        self.doc_type = doc_type;
        self
    }

    pub fn verified(mut self) -> Self {
        self.verification_status = VerificationStatus::Verified;
        self
    }

    pub fn with_snapshot_hash(mut self, hash: impl Into<String>) -> Self {
        self.snapshot_hash = Some(hash.into());
        self
    }
}

/// Lifecycle state for cards and relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Draft,
    Published,
    Retracted,
}

/// Fixed card-category vocabulary. `General` is the catch-all default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardCategory {
    Regulatory,
    Legal,
    Environmental,
    Labor,
    Financial,
    Governance,
    General,
}

impl CardCategory {
    /// Map the decision's free-text category onto the fixed vocabulary.
    pub fn from_free_text(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "REGULATORY" | "REGULATION" | "ENFORCEMENT" => Self::Regulatory,
            "LEGAL" | "LAWSUIT" | "LITIGATION" => Self::Legal,
            "ENVIRONMENTAL" | "ENVIRONMENT" | "CLIMATE" => Self::Environmental,
            "LABOR" | "LABOUR" | "EMPLOYMENT" | "WORKPLACE" => Self::Labor,
            "FINANCIAL" | "FINANCE" | "ACCOUNTING" => Self::Financial,
            "GOVERNANCE" | "CORPORATE_GOVERNANCE" => Self::Governance,
            _ => Self::General,
        }
    }
}

/// A sourced claim record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub category: CardCategory,
    pub entity_ids: Vec<Uuid>,
    pub source_refs: Vec<Uuid>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Create a card in Draft.
    pub fn new(title: impl Into<String>, summary: impl Into<String>, category: CardCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            summary: summary.into(),
            category,
            entity_ids: Vec::new(),
            source_refs: Vec::new(),
            status: RecordStatus::Draft,
            created_at: Utc::now(),
            published_at: None,
        }
    }

    pub fn with_entities(mut self, entity_ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.entity_ids.extend(entity_ids);
        self
    }

    pub fn with_source(mut self, source_id: Uuid) -> Self {
        self.source_refs.push(source_id);
        self
    }
}

/// Fixed relationship-type vocabulary. `AssociatedWith` is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    SubsidiaryOf,
    OwnerOf,
    PartnerOf,
    RegulatorOf,
    LitigantAgainst,
    SupplierTo,
    AssociatedWith,
}

impl RelationshipType {
    /// Map the decision's free-text relationship type onto the fixed vocabulary.
    pub fn from_free_text(raw: &str) -> Self {
        match raw.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "SUBSIDIARY_OF" | "SUBSIDIARY" => Self::SubsidiaryOf,
            "OWNER_OF" | "OWNS" | "OWNERSHIP" | "PARENT_OF" => Self::OwnerOf,
            "PARTNER_OF" | "PARTNERSHIP" | "JOINT_VENTURE" => Self::PartnerOf,
            "REGULATOR_OF" | "REGULATES" | "FINED" | "FINED_BY" | "INVESTIGATES" => {
                Self::RegulatorOf
            }
            "LITIGANT_AGAINST" | "SUED" | "SUING" | "LAWSUIT" => Self::LitigantAgainst,
            "SUPPLIER_TO" | "SUPPLIES" | "VENDOR_OF" => Self::SupplierTo,
            _ => Self::AssociatedWith,
        }
    }
}

/// A typed, sourced relationship between two entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Uuid,
    pub from_entity_id: Uuid,
    pub to_entity_id: Uuid,
    pub relationship_type: RelationshipType,
    pub description: Option<String>,
    pub source_refs: Vec<Uuid>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    /// Create a relationship in Draft.
    pub fn new(from: Uuid, to: Uuid, relationship_type: RelationshipType) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_entity_id: from,
            to_entity_id: to,
            relationship_type,
            description: None,
            source_refs: Vec::new(),
            status: RecordStatus::Draft,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source_id: Uuid) -> Self {
        self.source_refs.push(source_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Acme Corp."), "acme corp");
        assert_eq!(normalize_name("ACME   CORP"), "acme corp");
        assert_eq!(normalize_name("Acme, Corp!"), "acme corp");
        assert_eq!(normalize_name("  Acme Corp  "), "acme corp");
    }

    #[test]
    fn test_entity_type_default_arm() {
        assert_eq!(EntityType::from_free_text("CORPORATION"), EntityType::Corporation);
        assert_eq!(EntityType::from_free_text("ngo"), EntityType::Nonprofit);
        // Unknown input must never propagate unmapped
        assert_eq!(EntityType::from_free_text("SPACE AGENCY??"), EntityType::Organization);
        assert_eq!(EntityType::from_free_text(""), EntityType::Organization);
    }

    #[test]
    fn test_category_default_arm() {
        assert_eq!(CardCategory::from_free_text("regulatory"), CardCategory::Regulatory);
        assert_eq!(CardCategory::from_free_text("something else"), CardCategory::General);
    }

    #[test]
    fn test_relationship_type_default_arm() {
        assert_eq!(
            RelationshipType::from_free_text("subsidiary of"),
            RelationshipType::SubsidiaryOf
        );
        assert_eq!(RelationshipType::from_free_text("fined"), RelationshipType::RegulatorOf);
        assert_eq!(
            RelationshipType::from_free_text("mystery-link"),
            RelationshipType::AssociatedWith
        );
    }
}
