//! Candidate filtering, scoring, semantic augmentation, and ranking.

use std::time::Duration;

use findx_core::{
    DisabledSemanticSimilarity, Disposition, MatchCandidate, Report, ReportSummary, SemanticError,
    SemanticSimilarity,
};
use futures_util::{StreamExt, future, stream};
use tokio::runtime::Handle;

use crate::features::{FeatureScore, FeatureScorer, reason, round_confidence};

/// Candidates must score strictly above this confidence to be returned.
/// The same bound gates semantic augmentation.
pub const MIN_CONFIDENCE: u8 = 30;

/// Semantic confidence above which "AI high confidence" is recorded.
const AI_HIGH_CONFIDENCE: f64 = 70.0;
const LOCAL_SHARE: f64 = 0.6;
const SEMANTIC_SHARE: f64 = 0.4;

const DEFAULT_SEMANTIC_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONCURRENCY: usize = 4;

/// Tuning for [`MatchEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Upper bound on a single semantic comparison. Expiry is treated like
    /// any other semantic failure.
    pub semantic_timeout: Duration,
    /// Maximum number of semantic comparisons in flight. Zero is treated as
    /// one.
    pub concurrency: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            semantic_timeout: DEFAULT_SEMANTIC_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl MatchOptions {
    /// Override the per-comparison timeout.
    #[must_use]
    pub const fn with_semantic_timeout(mut self, timeout: Duration) -> Self {
        self.semantic_timeout = timeout;
        self
    }

    /// Override the number of comparisons allowed in flight.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Ranks candidate reports against a target.
///
/// The semantic backend is injected so hosts can plug in a remote model,
/// a deterministic stub, or nothing.
///
/// # Examples
/// ```
/// use findx_core::{Category, Disposition, Report};
/// use findx_matcher::MatchEngine;
/// use time::macros::datetime;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let at = datetime!(2024-05-01 10:00 UTC);
/// let lost = Report::new("lost", Disposition::Lost, Category::Pet, at)
///     .with_title("Brown beagle")
///     .with_tags(["beagle", "brown"]);
/// let pool = vec![
///     Report::new("found", Disposition::Found, Category::Pet, at)
///         .with_title("Brown beagle")
///         .with_tags(["beagle", "brown"]),
/// ];
///
/// let matches = MatchEngine::local().find_matches(&lost, &pool, false).await;
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].report.id, "found");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MatchEngine<S = DisabledSemanticSimilarity> {
    semantic: S,
    scorer: FeatureScorer,
    options: MatchOptions,
}

impl MatchEngine {
    /// Engine without a semantic backend. Augmentation requests fall back to
    /// local scores and are only logged at debug level.
    #[must_use]
    pub const fn local() -> Self {
        Self::new(DisabledSemanticSimilarity)
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::local()
    }
}

impl<S> MatchEngine<S> {
    /// Engine backed by `semantic` with default [`MatchOptions`].
    #[must_use]
    pub const fn new(semantic: S) -> Self {
        Self {
            semantic,
            scorer: FeatureScorer,
            options: MatchOptions {
                semantic_timeout: DEFAULT_SEMANTIC_TIMEOUT,
                concurrency: DEFAULT_CONCURRENCY,
            },
        }
    }

    /// Replace the engine's options.
    #[must_use]
    pub fn with_options(self, options: MatchOptions) -> Self {
        Self { options, ..self }
    }

    /// Options currently in force.
    #[must_use]
    pub const fn options(&self) -> MatchOptions {
        self.options
    }

    /// Borrow the semantic backend.
    #[must_use]
    pub const fn semantic(&self) -> &S {
        &self.semantic
    }
}

impl<S: SemanticSimilarity> MatchEngine<S> {
    /// Rank `candidates` against `target`, best first.
    ///
    /// Only active candidates of the opposite disposition and the same
    /// category are considered. When `use_semantic` is set, candidates whose
    /// local score already clears [`MIN_CONFIDENCE`] are also compared by the
    /// semantic backend and the two scores are blended `60/40`. A semantic
    /// failure or timeout affects only that candidate, which keeps its local
    /// score.
    ///
    /// Every returned candidate has a confidence above [`MIN_CONFIDENCE`].
    /// Ties keep their input order.
    ///
    /// Semantic comparisons are bounded with Tokio's timer. Outside a Tokio
    /// runtime they fail softly with [`SemanticError::NoRuntime`]. Inside
    /// one, the runtime must have its time driver enabled.
    pub async fn find_matches<'a>(
        &self,
        target: &Report,
        candidates: &'a [Report],
        use_semantic: bool,
    ) -> Vec<MatchCandidate<'a>> {
        let eligible: Vec<&'a Report> = candidates
            .iter()
            .filter(|candidate| is_eligible(target, candidate))
            .collect();
        log::debug!(
            "report {}: {} of {} candidates eligible",
            target.id,
            eligible.len(),
            candidates.len()
        );

        let mut matches: Vec<MatchCandidate<'a>> = stream::iter(eligible)
            .map(|candidate| self.evaluate(target, candidate, use_semantic))
            .buffered(self.options.concurrency.max(1))
            .filter_map(future::ready)
            .collect()
            .await;

        matches.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        matches
    }

    async fn evaluate<'a>(
        &self,
        target: &Report,
        candidate: &'a Report,
        use_semantic: bool,
    ) -> Option<MatchCandidate<'a>> {
        let FeatureScore {
            mut confidence,
            mut reasons,
        } = self.scorer.score(target, candidate);

        if use_semantic && confidence > f64::from(MIN_CONFIDENCE) {
            match self.semantic_confidence(target, candidate).await {
                Ok(semantic) => {
                    confidence = blend(confidence, semantic);
                    if semantic > AI_HIGH_CONFIDENCE {
                        reasons.push(reason::AI_HIGH_CONFIDENCE.to_owned());
                    }
                }
                Err(SemanticError::Unavailable) => log::debug!(
                    "no semantic backend for {} vs {}, keeping local score",
                    target.id,
                    candidate.id
                ),
                Err(err) => log::warn!(
                    "semantic comparison of {} with {} failed, keeping local score: {err}",
                    target.id,
                    candidate.id
                ),
            }
        }

        // Filtering on the rounded value keeps 30.4 from surfacing as 30.
        let rounded = round_confidence(confidence);
        log::debug!(
            "report {} vs {}: confidence {rounded}",
            target.id,
            candidate.id
        );
        (rounded > MIN_CONFIDENCE).then(|| MatchCandidate::new(candidate, rounded, reasons))
    }

    async fn semantic_confidence(
        &self,
        target: &Report,
        candidate: &Report,
    ) -> Result<f64, SemanticError> {
        let (lost, found) = match target.disposition {
            Disposition::Lost => (target, candidate),
            Disposition::Found => (candidate, target),
        };
        let lost_summary = ReportSummary::from(lost);
        let found_summary = ReportSummary::from(found);

        if Handle::try_current().is_err() {
            return Err(SemanticError::NoRuntime);
        }

        let timeout = self.options.semantic_timeout;
        let verdict = tokio::time::timeout(
            timeout,
            self.semantic.compare(&lost_summary, &found_summary),
        )
        .await
        .map_err(|_| SemanticError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })??;
        verdict.sanitised_confidence()
    }
}

fn is_eligible(target: &Report, candidate: &Report) -> bool {
    candidate.disposition == target.disposition.opposite()
        && candidate.category == target.category
        && candidate.is_active()
}

#[expect(
    clippy::float_arithmetic,
    reason = "weighted blend of two confidences"
)]
fn blend(local: f64, semantic: f64) -> f64 {
    LOCAL_SHARE * local + SEMANTIC_SHARE * semantic
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    clippy::float_arithmetic,
    reason = "tests fail fast on broken setup and compare floating point values"
)]
mod tests {
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    use super::*;
    use findx_core::test_support::StubSemanticSimilarity;
    use findx_core::{Category, ReportStatus};
    use rstest::{fixture, rstest};
    use time::macros::datetime;

    /// Poll `future` once without any runtime, as a foreign executor would.
    fn poll_without_runtime<F: Future>(future: F) -> Option<F::Output> {
        let mut pinned = pin!(future);
        let mut context = Context::from_waker(Waker::noop());
        match pinned.as_mut().poll(&mut context) {
            Poll::Ready(output) => Some(output),
            Poll::Pending => None,
        }
    }

    /// Titled pet reports filed together: title and time agree, nothing else.
    fn titled_pair(lost_location: Option<(f64, f64)>) -> (Report, Report) {
        let at = datetime!(2024-05-01 10:00 UTC);
        let mut lost = Report::new("lost", Disposition::Lost, Category::Pet, at)
            .with_title("Brown beagle");
        if let Some((lat, lng)) = lost_location {
            lost = lost.with_location(lat, lng);
        }
        let found = Report::new("found", Disposition::Found, Category::Pet, at)
            .with_title("Brown beagle")
            .with_location(40.7128, -74.0060);
        (lost, found)
    }

    #[fixture]
    fn lost_beagle() -> Report {
        Report::new(
            "lost-beagle",
            Disposition::Lost,
            Category::Pet,
            datetime!(2024-05-01 10:00 UTC),
        )
        .with_title("Brown beagle with red collar")
        .with_tags(["beagle", "brown", "collar"])
        .with_location(51.5072, -0.1276)
    }

    fn found_beagle(id: &str) -> Report {
        Report::new(
            id,
            Disposition::Found,
            Category::Pet,
            datetime!(2024-05-01 16:00 UTC),
        )
        .with_title("Brown beagle with red collar")
        .with_tags(["beagle", "brown", "collar"])
        .with_location(51.5080, -0.1280)
    }

    #[rstest]
    fn options_default_to_ten_seconds_and_four_in_flight() {
        let options = MatchOptions::default();
        assert_eq!(options.semantic_timeout, Duration::from_secs(10));
        assert_eq!(options.concurrency, 4);
        assert_eq!(MatchEngine::local().options(), options);
    }

    #[rstest]
    #[case(80.0, 90.0, 84.0)]
    #[case(40.0, 0.0, 24.0)]
    #[case(35.0, 100.0, 61.0)]
    fn blend_weights_local_sixty_forty(
        #[case] local: f64,
        #[case] semantic: f64,
        #[case] expected: f64,
    ) {
        assert!((blend(local, semantic) - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(Disposition::Found, Category::Pet, ReportStatus::Active, true)]
    #[case(Disposition::Lost, Category::Pet, ReportStatus::Active, false)]
    #[case(Disposition::Found, Category::Item, ReportStatus::Active, false)]
    #[case(Disposition::Found, Category::Pet, ReportStatus::Matched, false)]
    #[case(Disposition::Found, Category::Pet, ReportStatus::Closed, false)]
    fn eligibility_requires_opposite_same_category_active(
        lost_beagle: Report,
        #[case] disposition: Disposition,
        #[case] category: Category,
        #[case] status: ReportStatus,
        #[case] expected: bool,
    ) {
        let mut candidate = found_beagle("c").with_status(status);
        candidate.disposition = disposition;
        candidate.category = category;
        assert_eq!(is_eligible(&lost_beagle, &candidate), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn semantic_blend_adds_high_confidence_reason(lost_beagle: Report) {
        let pool = vec![found_beagle("f-1")];
        let engine = MatchEngine::new(StubSemanticSimilarity::with_confidence(90.0));

        let local = MatchEngine::local()
            .find_matches(&lost_beagle, &pool, false)
            .await;
        let augmented = engine.find_matches(&lost_beagle, &pool, true).await;

        let local_top = local.first().expect("local match");
        let augmented_top = augmented.first().expect("augmented match");
        assert!(!local_top.has_reason(reason::AI_HIGH_CONFIDENCE));
        assert!(augmented_top.has_reason(reason::AI_HIGH_CONFIDENCE));
        assert_eq!(engine.semantic().calls(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn semantic_is_skipped_when_not_requested(lost_beagle: Report) {
        let pool = vec![found_beagle("f-1")];
        let engine = MatchEngine::new(StubSemanticSimilarity::with_confidence(90.0));
        let matches = engine.find_matches(&lost_beagle, &pool, false).await;
        assert_eq!(matches.len(), 1);
        assert_eq!(engine.semantic().calls(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn weak_local_scores_skip_the_backend(lost_beagle: Report) {
        let stranger = Report::new(
            "stranger",
            Disposition::Found,
            Category::Pet,
            datetime!(2024-04-01 10:00 UTC),
        )
        .with_title("Grey tabby")
        .with_tags(["cat"])
        .with_location(40.7128, -74.0060);
        let pool = vec![stranger];
        let engine = MatchEngine::new(StubSemanticSimilarity::with_confidence(100.0));

        let matches = engine.find_matches(&lost_beagle, &pool, true).await;
        assert!(matches.is_empty());
        assert_eq!(engine.semantic().calls(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn failures_keep_the_local_score(lost_beagle: Report) {
        let pool = vec![found_beagle("f-1")];
        let failing = MatchEngine::new(StubSemanticSimilarity::with_error(
            SemanticError::Network {
                message: "connection reset".to_owned(),
            },
        ));

        let local = MatchEngine::local()
            .find_matches(&lost_beagle, &pool, false)
            .await;
        let degraded = failing.find_matches(&lost_beagle, &pool, true).await;
        assert_eq!(local, degraded);
    }

    #[rstest]
    #[tokio::test]
    async fn non_finite_semantic_confidence_is_a_soft_failure(lost_beagle: Report) {
        let pool = vec![found_beagle("f-1")];
        let engine = MatchEngine::new(StubSemanticSimilarity::with_confidence(f64::NAN));
        let local = MatchEngine::local()
            .find_matches(&lost_beagle, &pool, false)
            .await;
        assert_eq!(engine.find_matches(&lost_beagle, &pool, true).await, local);
    }

    #[rstest]
    #[tokio::test]
    async fn out_of_range_semantic_confidence_is_clamped(lost_beagle: Report) {
        let pool = vec![found_beagle("f-1")];
        let engine = MatchEngine::new(StubSemanticSimilarity::with_confidence(500.0));
        let matches = engine.find_matches(&lost_beagle, &pool, true).await;
        let top = matches.first().expect("clamped match");
        assert!(top.confidence <= 100);
    }

    #[rstest]
    #[tokio::test]
    async fn zero_concurrency_still_makes_progress(lost_beagle: Report) {
        let pool = vec![found_beagle("f-1"), found_beagle("f-2")];
        let engine = MatchEngine::new(StubSemanticSimilarity::with_confidence(80.0))
            .with_options(MatchOptions::default().with_concurrency(0));
        let matches = engine.find_matches(&lost_beagle, &pool, true).await;
        assert_eq!(matches.len(), 2);
        assert_eq!(engine.semantic().calls(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn ties_keep_input_order(lost_beagle: Report) {
        let pool = vec![found_beagle("first"), found_beagle("second")];
        let matches = MatchEngine::local()
            .find_matches(&lost_beagle, &pool, false)
            .await;
        let ids: Vec<&str> = matches.iter().map(|m| m.report.id.as_str()).collect();
        assert_eq!(ids, ["first", "second"]);
    }

    #[rstest]
    #[tokio::test]
    async fn found_targets_are_compared_as_found(lost_beagle: Report) {
        let found = found_beagle("f-1");
        let pool = vec![lost_beagle];
        let matches = MatchEngine::local().find_matches(&found, &pool, false).await;
        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches.first().map(|m| m.report.id.as_str()),
            Some("lost-beagle")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn local_score_of_exactly_thirty_skips_the_backend() {
        // Far apart: title (20) and time (10) out of 100.
        let (lost, found) = titled_pair(Some((51.5072, -0.1276)));
        let local = FeatureScorer.score(&lost, &found).confidence;
        assert!((local - 30.0).abs() < 1e-9);

        let pool = vec![found];
        let engine = MatchEngine::new(StubSemanticSimilarity::with_confidence(100.0));
        let matches = engine.find_matches(&lost, &pool, true).await;

        assert!(matches.is_empty());
        assert_eq!(engine.semantic().calls(), 0);
    }

    #[rstest]
    #[case(16.0, None)]
    #[case(16.25, Some(31))]
    #[tokio::test]
    async fn blended_scores_are_cut_after_rounding(
        #[case] semantic: f64,
        #[case] expected: Option<u8>,
    ) {
        // No lost location: title (20) and time (10) out of 75 is 40 locally,
        // so the blend is 24 + 0.4 * semantic (30.4 and 30.5).
        let (lost, found) = titled_pair(None);
        assert!((FeatureScorer.score(&lost, &found).confidence - 40.0).abs() < 1e-9);

        let pool = vec![found];
        let engine = MatchEngine::new(StubSemanticSimilarity::with_confidence(semantic));
        let matches = engine.find_matches(&lost, &pool, true).await;

        assert_eq!(engine.semantic().calls(), 1);
        assert_eq!(matches.first().map(|m| m.confidence), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn local_engine_keeps_local_scores_when_semantic_is_requested(lost_beagle: Report) {
        let pool = vec![found_beagle("f-1")];
        let engine = MatchEngine::local();
        assert_eq!(
            engine.find_matches(&lost_beagle, &pool, true).await,
            engine.find_matches(&lost_beagle, &pool, false).await
        );
    }

    #[rstest]
    fn semantic_requests_outside_tokio_keep_the_local_score(lost_beagle: Report) {
        let pool = vec![found_beagle("f-1")];
        let engine = MatchEngine::new(StubSemanticSimilarity::with_confidence(90.0));

        let augmented = poll_without_runtime(engine.find_matches(&lost_beagle, &pool, true))
            .expect("stub comparisons complete on the first poll");
        let local = poll_without_runtime(engine.find_matches(&lost_beagle, &pool, false))
            .expect("local scoring completes on the first poll");

        assert_eq!(augmented, local);
        assert_eq!(augmented.len(), 1);
        assert_eq!(engine.semantic().calls(), 0);
    }
}
