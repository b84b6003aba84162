//! Deterministic semantic backends for unit and behaviour tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{ReportSummary, SemanticError, SemanticSimilarity, SemanticVerdict};

/// Stub [`SemanticSimilarity`] returning pre-configured responses.
///
/// The default response applies to every pair unless an override is keyed
/// on the found report's title. Calls are counted so tests can assert
/// whether the engine consulted the backend at all.
#[derive(Debug)]
pub struct StubSemanticSimilarity {
    default: Result<SemanticVerdict, SemanticError>,
    overrides: HashMap<String, Result<SemanticVerdict, SemanticError>>,
    calls: AtomicUsize,
}

impl StubSemanticSimilarity {
    /// Create a backend answering every pair with `confidence` and no
    /// reasons.
    #[must_use]
    pub fn with_confidence(confidence: f64) -> Self {
        Self::with_verdict(SemanticVerdict::new(confidence, Vec::new()))
    }

    /// Create a backend answering every pair with `verdict`.
    #[must_use]
    pub fn with_verdict(verdict: SemanticVerdict) -> Self {
        Self::from_response(Ok(verdict))
    }

    /// Create a backend failing every pair with `error`.
    #[must_use]
    pub fn with_error(error: SemanticError) -> Self {
        Self::from_response(Err(error))
    }

    /// Fail comparisons whose found report is titled `title`.
    #[must_use]
    pub fn failing_for(mut self, title: impl Into<String>, error: SemanticError) -> Self {
        self.overrides.insert(title.into(), Err(error));
        self
    }

    /// Answer comparisons whose found report is titled `title` with
    /// `confidence`.
    #[must_use]
    pub fn answering_for(mut self, title: impl Into<String>, confidence: f64) -> Self {
        self.overrides
            .insert(title.into(), Ok(SemanticVerdict::new(confidence, Vec::new())));
        self
    }

    /// Number of comparisons served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn from_response(default: Result<SemanticVerdict, SemanticError>) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SemanticSimilarity for StubSemanticSimilarity {
    async fn compare(
        &self,
        _lost: &ReportSummary<'_>,
        found: &ReportSummary<'_>,
    ) -> Result<SemanticVerdict, SemanticError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.overrides
            .get(found.title)
            .unwrap_or(&self.default)
            .clone()
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    clippy::float_arithmetic,
    reason = "tests fail fast on broken setup and compare floating point values"
)]
mod tests {
    use super::*;
    use crate::Category;
    use rstest::rstest;

    fn summary(title: &str) -> ReportSummary<'_> {
        ReportSummary {
            title,
            description: "",
            tags: &[],
            category: Category::Item,
        }
    }

    #[tokio::test]
    async fn default_response_applies_without_override() {
        let stub = StubSemanticSimilarity::with_confidence(80.0);
        let verdict = stub
            .compare(&summary("a"), &summary("b"))
            .await
            .expect("default verdict");
        assert!((verdict.confidence - 80.0).abs() < f64::EPSILON);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn overrides_key_on_found_title() {
        let stub = StubSemanticSimilarity::with_confidence(80.0)
            .failing_for("broken", SemanticError::Unavailable);
        let err = stub
            .compare(&summary("a"), &summary("broken"))
            .await
            .expect_err("override should fail");
        assert_eq!(err, SemanticError::Unavailable);
        assert!(
            stub.compare(&summary("broken"), &summary("a"))
                .await
                .is_ok()
        );
        assert_eq!(stub.calls(), 2);
    }

    #[rstest]
    fn error_stub_starts_uncalled() {
        let stub = StubSemanticSimilarity::with_error(SemanticError::Timeout { timeout_ms: 5 });
        assert_eq!(stub.calls(), 0);
    }
}
