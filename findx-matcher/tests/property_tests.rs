#![expect(
    clippy::expect_used,
    clippy::float_arithmetic,
    reason = "property assertions compare floating point values"
)]

//! Property-based tests for the match engine and its scoring primitives.
//!
//! # Invariants tested
//!
//! - **Distance:** symmetric, zero for identical points, never negative.
//! - **Similarity ranges:** text similarity and tag overlap stay in `[0, 1]`.
//! - **Self-similarity:** a text or tag list compared with itself scores 1.
//! - **Eligibility:** every match has the opposite disposition, the same
//!   category, and an active status.
//! - **Threshold and order:** every confidence exceeds 30 and results are
//!   sorted best first.
//! - **Quick score:** zero for reports sharing a disposition.


use findx_core::ReportStatus;
use findx_matcher::{
    MIN_CONFIDENCE, MatchEngine, haversine_km, quick_match_score, tag_overlap, text_similarity,
};
use geo::Coord;
use proptest::prelude::*;

use proptest_support::{phrase_strategy, pool_strategy, report_strategy, tags_strategy};

fn coord_strategy() -> impl Strategy<Value = Coord<f64>> {
    (-180.0_f64..=180.0_f64, -90.0_f64..=90.0_f64).prop_map(|(x, y)| Coord { x, y })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: distance does not depend on argument order.
    #[test]
    fn distance_is_symmetric(a in coord_strategy(), b in coord_strategy()) {
        let forward = haversine_km(a, b);
        let backward = haversine_km(b, a);
        prop_assert!(forward >= 0.0);
        prop_assert!((forward - backward).abs() < 1e-6);
    }

    /// Property: a point is zero kilometres from itself.
    #[test]
    fn distance_identity(a in coord_strategy()) {
        prop_assert!(haversine_km(a, a).abs() < 1e-9);
    }

    /// Property: text similarity is bounded and reflexive.
    #[test]
    fn text_similarity_is_bounded(left in phrase_strategy(), right in phrase_strategy()) {
        let score = text_similarity(&left, &right);
        prop_assert!((0.0..=1.0).contains(&score));
        if !left.is_empty() {
            prop_assert!((text_similarity(&left, &left) - 1.0).abs() < 1e-9);
        }
    }

    /// Property: tag overlap is bounded, reflexive, and zero for empty lists.
    #[test]
    fn tag_overlap_is_bounded(left in tags_strategy(), right in tags_strategy()) {
        let score = tag_overlap(&left, &right);
        prop_assert!((0.0..=1.0).contains(&score));
        if left.is_empty() {
            prop_assert!(score.abs() < f64::EPSILON);
        } else {
            prop_assert!((tag_overlap(&left, &left) - 1.0).abs() < 1e-9);
        }
    }

    /// Property: same-disposition pairs never earn a quick score.
    #[test]
    fn quick_score_ignores_same_disposition(a in report_strategy(), b in report_strategy()) {
        let mut twin = b;
        twin.disposition = a.disposition;
        prop_assert_eq!(quick_match_score(&a, &twin), 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: returned matches are eligible, above threshold, and ranked.
    #[test]
    fn engine_results_are_eligible_and_ranked(
        target in report_strategy(),
        pool in pool_strategy(12),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let matches = runtime.block_on(MatchEngine::local().find_matches(&target, &pool, true));

        for candidate in &matches {
            prop_assert_ne!(candidate.report.disposition, target.disposition);
            prop_assert_eq!(candidate.report.category, target.category);
            prop_assert_eq!(candidate.report.status, ReportStatus::Active);
            prop_assert!(candidate.confidence > MIN_CONFIDENCE);
            prop_assert!(candidate.confidence <= 100);
        }
        prop_assert!(
            matches
                .windows(2)
                .all(|pair| matches!(pair, [a, b] if a.confidence >= b.confidence))
        );

        let opposite = target.disposition.opposite();
        prop_assert!(matches.len() <= pool.iter().filter(|r| r.disposition == opposite).count());
    }
}
