//! Duplicate detection over recently published cards.
//!
//! The check runs against a bounded most-recent window, not the whole
//! corpus. A duplicate older than the window slips through; that tradeoff
//! is configured by `ReviewConfig::dedup_window` and documented there.

use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::traits::store::CardStore;
use crate::types::records::{normalize_name, Card};

/// Normalized-title prefix length for the fuzzy clause.
const PREFIX_LEN: usize = 50;

/// Normalize a card title for comparison. Same treatment as entity names:
/// lowercase, punctuation stripped, whitespace collapsed.
pub fn normalize_title(title: &str) -> String {
    normalize_name(title)
}

fn prefix(normalized: &str) -> &str {
    match normalized.char_indices().nth(PREFIX_LEN) {
        Some((byte_index, _)) => &normalized[..byte_index],
        None => normalized,
    }
}

/// Whether a candidate card duplicates a published one.
///
/// Two clauses, either sufficient:
/// - exact normalized-title match
/// - at least one shared entity AND equal 50-character normalized-title
///   prefixes
pub fn is_duplicate_of(title: &str, entity_ids: &[Uuid], published: &Card) -> bool {
    let candidate = normalize_title(title);
    let existing = normalize_title(&published.title);

    if candidate == existing {
        return true;
    }

    let shares_entity = entity_ids.iter().any(|id| published.entity_ids.contains(id));
    shares_entity && prefix(&candidate) == prefix(&existing)
}

/// Scan the recent-published window for a duplicate of the candidate card.
/// Returns the first match, newest first.
pub async fn find_duplicate<S: CardStore>(
    store: &S,
    title: &str,
    entity_ids: &[Uuid],
    window: usize,
) -> Result<Option<Card>> {
    let recent = store.recent_published_cards(window).await?;
    for card in recent {
        if is_duplicate_of(title, entity_ids, &card) {
            info!(card_id = %card.id, title, "Duplicate card detected in recent window");
            return Ok(Some(card));
        }
    }
    Ok(None)
}
