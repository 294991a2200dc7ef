//! Configuration for the review pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration surface for a review run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Kill switch. When false, a run is a no-op that returns an empty summary.
    pub enabled: bool,

    /// Simulate the pipeline without persisting writes.
    pub dry_run: bool,

    /// Per-run item cap. Default: 20.
    pub max_items_per_run: usize,

    /// Confidence gate: PUBLISH below this is downgraded to SKIP. Default: 0.8.
    pub min_confidence: f64,

    /// How many recently published cards the duplicate detector inspects.
    ///
    /// Duplicates older than this window are missed — an accepted,
    /// documented limitation rather than a guarantee. Default: 100.
    pub dedup_window: usize,

    /// Review prompt template location. When unset, the built-in template
    /// is used. Loaded once per process lifetime.
    pub prompt_template_path: Option<PathBuf>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dry_run: false,
            max_items_per_run: 20,
            min_confidence: 0.8,
            dedup_window: 100,
            prompt_template_path: None,
        }
    }
}

impl ReviewConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable the pipeline entirely.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Enable dry-run mode.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Set the per-run item cap.
    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items_per_run = max;
        self
    }

    /// Set the confidence gate threshold.
    pub fn with_min_confidence(mut self, min: f64) -> Self {
        self.min_confidence = min;
        self
    }

    /// Set the duplicate-detection window.
    pub fn with_dedup_window(mut self, window: usize) -> Self {
        self.dedup_window = window;
        self
    }

    /// Load the prompt template from a file instead of the built-in.
    pub fn with_prompt_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_template_path = Some(path.into());
        self
    }
}
