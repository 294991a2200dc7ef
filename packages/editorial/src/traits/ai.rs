//! ReviewModel trait: the LLM seam.
//!
//! The pipeline asks the model for exactly one structured decision per item
//! and treats the response as untrusted text. Transport concerns — retries,
//! backoff on rate limits, per-call timeouts — live behind this trait.

use async_trait::async_trait;

use crate::error::Result;

/// LLM seam for editorial review.
///
/// Implementations wrap a specific provider and are expected to request
/// deterministic output (temperature 0) with a bounded token budget. The
/// returned string is raw model text; validation happens in the pipeline.
#[async_trait]
pub trait ReviewModel: Send + Sync {
    /// Ask the model for a single review decision.
    async fn review(&self, prompt: &str) -> Result<String>;
}
