//! Hand-rolled mocks for pipeline tests.
//!
//! `MockReviewModel` matches canned responses against prompt fragments and
//! records every prompt it sees; `MockSnapshotter` serves canned page
//! content keyed by URL. Both are plain structs with builder methods, usable
//! from unit and integration tests alike.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ReviewError, Result};
use crate::traits::ai::ReviewModel;
use crate::traits::snapshot::{Snapshot, Snapshotter};

/// Default canned response: a skip, so unconfigured prompts never publish.
const DEFAULT_RESPONSE: &str =
    r#"{"decision": "SKIP", "reason": "No canned response configured", "confidence": 0.0}"#;

/// A scripted review model.
///
/// Responses are keyed by substring match against the rendered prompt, in
/// registration order; unmatched prompts get the default skip response.
#[derive(Debug, Default)]
pub struct MockReviewModel {
    responses: Vec<(String, String)>,
    fail_fragments: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl MockReviewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `response` for any prompt containing `fragment`.
    pub fn with_response(mut self, fragment: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.push((fragment.into(), response.into()));
        self
    }

    /// Fail the call (transport error) for any prompt containing `fragment`.
    pub fn failing_for(mut self, fragment: impl Into<String>) -> Self {
        self.fail_fragments.push(fragment.into());
        self
    }

    /// Prompts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ReviewModel for MockReviewModel {
    async fn review(&self, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(prompt.to_string());

        if let Some(fragment) = self.fail_fragments.iter().find(|f| prompt.contains(f.as_str())) {
            return Err(ReviewError::Model(
                format!("mock failure triggered by {fragment:?}").into(),
            ));
        }
        let response = self
            .responses
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string());
        Ok(response)
    }
}

/// A scripted snapshotter.
///
/// URLs without canned content still capture successfully with placeholder
/// content, so tests only script what they assert on.
#[derive(Debug, Default)]
pub struct MockSnapshotter {
    content: HashMap<String, String>,
    fail_urls: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockSnapshotter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `url`.
    pub fn with_content(mut self, url: impl Into<String>, content: impl Into<String>) -> Self {
        self.content.insert(url.into(), content.into());
        self
    }

    /// Fail captures of `url`.
    pub fn failing_for(mut self, url: impl Into<String>) -> Self {
        self.fail_urls.insert(url.into());
        self
    }

    /// URLs captured so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Snapshotter for MockSnapshotter {
    async fn capture(&self, url: &str) -> Result<Snapshot> {
        self.calls.lock().unwrap().push(url.to_string());

        if self.fail_urls.contains(url) {
            return Err(ReviewError::Snapshot(format!("mock capture failure for {url}")));
        }
        let content = self
            .content
            .get(url)
            .cloned()
            .unwrap_or_else(|| format!("snapshot of {url}"));
        Ok(Snapshot::new(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_model_matches_fragments_in_order() {
        let model = MockReviewModel::new()
            .with_response("Acme", r#"{"decision": "PUBLISH", "confidence": 0.9}"#)
            .with_response("Globex", r#"{"decision": "SKIP", "reason": "r"}"#);

        let acme = model.review("Title: Acme fined").await.unwrap();
        assert!(acme.contains("PUBLISH"));
        let other = model.review("Title: Initech IPO").await.unwrap();
        assert!(other.contains("SKIP"));
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_model_failure_trigger() {
        let model = MockReviewModel::new().failing_for("Acme");
        let err = model.review("Title: Acme fined").await.unwrap_err();
        assert!(matches!(err, ReviewError::Model(_)));
    }

    #[tokio::test]
    async fn test_mock_snapshotter_defaults_to_success() {
        let snapshotter = MockSnapshotter::new();
        let snap = snapshotter.capture("https://x.example/a").await.unwrap();
        assert!(!snap.content_hash.is_empty());
        assert_eq!(snapshotter.calls(), vec!["https://x.example/a"]);
    }
}
