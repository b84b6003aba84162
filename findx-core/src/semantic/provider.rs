//! Semantic similarity trait, its request and response types, and the
//! disabled implementation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Category, Report};

use super::error::SemanticError;

/// The parts of a report a semantic backend compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary<'a> {
    /// Report title.
    pub title: &'a str,
    /// Report description.
    pub description: &'a str,
    /// Report tags, in report order.
    pub tags: &'a [String],
    /// Report category.
    pub category: Category,
}

impl<'a> From<&'a Report> for ReportSummary<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            title: &report.title,
            description: &report.description,
            tags: &report.tags,
            category: report.category,
        }
    }
}

/// A semantic backend's judgement on a pair of reports.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticVerdict {
    /// Match likelihood on a `0..=100` scale. Backends may stray outside the
    /// range; use [`SemanticVerdict::sanitised_confidence`] before relying
    /// on it.
    pub confidence: f64,
    /// The backend's own explanations.
    pub reasons: Vec<String>,
}

impl SemanticVerdict {
    /// Build a verdict.
    #[must_use]
    pub const fn new(confidence: f64, reasons: Vec<String>) -> Self {
        Self {
            confidence,
            reasons,
        }
    }

    /// Clamp the confidence into `0.0..=100.0`.
    ///
    /// # Errors
    /// Returns [`SemanticError::NonFiniteConfidence`] for NaN or infinite
    /// values.
    pub const fn sanitised_confidence(&self) -> Result<f64, SemanticError> {
        if !self.confidence.is_finite() {
            return Err(SemanticError::NonFiniteConfidence);
        }
        Ok(self.confidence.clamp(0.0, 100.0))
    }
}

/// Compare a lost and a found report with an external similarity model.
///
/// Implementations must be thread-safe (`Send` + `Sync`) so the engine can
/// fan calls out across candidates. Calls carry no shared state; every
/// failure is surfaced as a [`SemanticError`] rather than a panic.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use findx_core::{ReportSummary, SemanticError, SemanticSimilarity, SemanticVerdict};
///
/// struct SameTitle;
///
/// #[async_trait]
/// impl SemanticSimilarity for SameTitle {
///     async fn compare(
///         &self,
///         lost: &ReportSummary<'_>,
///         found: &ReportSummary<'_>,
///     ) -> Result<SemanticVerdict, SemanticError> {
///         let confidence = if lost.title == found.title { 100.0 } else { 0.0 };
///         Ok(SemanticVerdict::new(confidence, Vec::new()))
///     }
/// }
/// ```
#[async_trait]
pub trait SemanticSimilarity: Send + Sync {
    /// Judge whether `lost` and `found` describe the same subject.
    async fn compare(
        &self,
        lost: &ReportSummary<'_>,
        found: &ReportSummary<'_>,
    ) -> Result<SemanticVerdict, SemanticError>;
}

#[async_trait]
impl<T: SemanticSimilarity + ?Sized> SemanticSimilarity for Box<T> {
    async fn compare(
        &self,
        lost: &ReportSummary<'_>,
        found: &ReportSummary<'_>,
    ) -> Result<SemanticVerdict, SemanticError> {
        (**self).compare(lost, found).await
    }
}

#[async_trait]
impl<T: SemanticSimilarity + ?Sized> SemanticSimilarity for Arc<T> {
    async fn compare(
        &self,
        lost: &ReportSummary<'_>,
        found: &ReportSummary<'_>,
    ) -> Result<SemanticVerdict, SemanticError> {
        (**self).compare(lost, found).await
    }
}

/// Backend used when no semantic model is configured.
///
/// Every comparison fails with [`SemanticError::Unavailable`], so the
/// engine falls back to its local score.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSemanticSimilarity;

#[async_trait]
impl SemanticSimilarity for DisabledSemanticSimilarity {
    async fn compare(
        &self,
        _lost: &ReportSummary<'_>,
        _found: &ReportSummary<'_>,
    ) -> Result<SemanticVerdict, SemanticError> {
        Err(SemanticError::Unavailable)
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
    use crate::Disposition;
    use rstest::rstest;
    use time::macros::datetime;

    fn sample_report() -> Report {
        Report::new(
            "r-1",
            Disposition::Lost,
            Category::Pet,
            datetime!(2024-05-01 10:00 UTC),
        )
        .with_title("Lost beagle")
        .with_description("Brown collar")
        .with_tags(["beagle"])
    }

    #[rstest]
    fn summary_borrows_report_fields() {
        let report = sample_report();
        let summary = ReportSummary::from(&report);
        assert_eq!(summary.title, "Lost beagle");
        assert_eq!(summary.description, "Brown collar");
        assert_eq!(summary.tags, ["beagle".to_owned()].as_slice());
        assert_eq!(summary.category, Category::Pet);
    }

    #[rstest]
    #[case(150.0, 100.0)]
    #[case(-5.0, 0.0)]
    #[case(42.5, 42.5)]
    fn sanitised_confidence_clamps(#[case] raw: f64, #[case] expected: f64) {
        let verdict = SemanticVerdict::new(raw, Vec::new());
        let value = verdict.sanitised_confidence().expect("finite confidence");
        assert!((value - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn sanitised_confidence_rejects_non_finite(#[case] raw: f64) {
        let verdict = SemanticVerdict::new(raw, Vec::new());
        assert_eq!(
            verdict.sanitised_confidence(),
            Err(SemanticError::NonFiniteConfidence)
        );
    }

    #[tokio::test]
    async fn disabled_backend_is_unavailable() {
        let report = sample_report();
        let summary = ReportSummary::from(&report);
        let err = DisabledSemanticSimilarity
            .compare(&summary, &summary)
            .await
            .expect_err("disabled backend never answers");
        assert_eq!(err, SemanticError::Unavailable);
    }

    #[tokio::test]
    async fn boxed_backends_forward_calls() {
        let report = sample_report();
        let summary = ReportSummary::from(&report);
        let boxed: Box<dyn SemanticSimilarity> = Box::new(DisabledSemanticSimilarity);
        let err = boxed
            .compare(&summary, &summary)
            .await
            .expect_err("forwarded to disabled backend");
        assert_eq!(err, SemanticError::Unavailable);
    }
}
