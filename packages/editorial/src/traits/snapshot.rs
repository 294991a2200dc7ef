//! Snapshotter trait: page capture for source records.
//!
//! Capturing is best-effort — the orchestrator logs and swallows failures,
//! publication proceeds without a snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A captured copy of a source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub content: String,
    /// SHA-256 hex of `content`
    pub content_hash: String,
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot from raw content, computing the hash.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let content_hash = hash_content(&content);
        Self {
            content,
            content_hash,
            captured_at: Utc::now(),
        }
    }
}

/// SHA-256 hex digest of document content.
pub fn hash_content(content: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Snapshot seam for source documents.
#[async_trait]
pub trait Snapshotter: Send + Sync {
    /// Retrieve and hash the document at `url`.
    async fn capture(&self, url: &str) -> Result<Snapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        let a = hash_content("hello");
        let b = hash_content("hello");
        let c = hash_content("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64); // SHA-256 hex
    }

    #[test]
    fn test_snapshot_hashes_content() {
        let snap = Snapshot::new("document body");
        assert_eq!(snap.content_hash, hash_content("document body"));
    }
}
