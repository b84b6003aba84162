//! Weighted feature scoring for one target/candidate pair.
//!
//! Each feature contributes `score × weight` to a running total and its
//! weight to a running denominator. Location only participates when both
//! reports carry a usable coordinate, so a report without a location is
//! scored out of 75 rather than 100 and its remaining features are
//! proportionally amplified.

use findx_core::Report;
use time::OffsetDateTime;

use crate::distance::report_distance_km;
use crate::tags::tag_overlap;
use crate::text::text_similarity;

/// Reason strings emitted by the scorers. They are shown to users verbatim.
pub mod reason {
    /// Both reports share a category.
    pub const SAME_CATEGORY: &str = "Same category";
    /// Prefix for reports less than 1 km apart.
    pub const VERY_CLOSE: &str = "Very close";
    /// Prefix for reports less than 5 km apart.
    pub const NEARBY: &str = "Nearby";
    /// Prefix for reports less than 10 km apart.
    pub const SAME_AREA: &str = "Same area";
    /// Titles share vocabulary.
    pub const SIMILAR_TITLE: &str = "Similar title";
    /// Descriptions share vocabulary.
    pub const SIMILAR_DESCRIPTION: &str = "Similar description";
    /// Tag lists overlap.
    pub const MATCHING_TAGS: &str = "Matching AI tags";
    /// Filed less than a day apart.
    pub const SAME_DAY: &str = "Reported same day";
    /// The semantic backend is confident the reports match.
    pub const AI_HIGH_CONFIDENCE: &str = "AI high confidence";
}

const LOCATION_WEIGHT: f64 = 25.0;
const TITLE_WEIGHT: f64 = 20.0;
const DESCRIPTION_WEIGHT: f64 = 15.0;
const TAG_WEIGHT: f64 = 30.0;
const TIME_WEIGHT: f64 = 10.0;

/// Similarity above which a text or tag feature earns a reason.
const REASON_THRESHOLD: f64 = 0.3;

/// Unrounded confidence and explanations for one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureScore {
    /// Confidence on a `0.0..=100.0` scale, not yet rounded.
    pub confidence: f64,
    /// Reasons in feature order.
    pub reasons: Vec<String>,
}

/// Scores a candidate against a target using location, text, tag, and time
/// features.
///
/// # Examples
/// ```
/// use findx_core::{Category, Disposition, Report};
/// use findx_matcher::FeatureScorer;
/// use time::macros::datetime;
///
/// let at = datetime!(2024-05-01 10:00 UTC);
/// let lost = Report::new("1", Disposition::Lost, Category::Pet, at).with_tags(["beagle"]);
/// let found = Report::new("2", Disposition::Found, Category::Pet, at).with_tags(["Beagle"]);
///
/// let score = FeatureScorer.score(&lost, &found);
/// assert!(score.reasons.iter().any(|r| r == "Matching AI tags"));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureScorer;

impl FeatureScorer {
    /// Score `candidate` against `target`.
    ///
    /// Eligibility (disposition, category, status) is the caller's concern;
    /// this method scores any pair it is given.
    #[must_use]
    pub fn score(&self, target: &Report, candidate: &Report) -> FeatureScore {
        let mut tally = Tally::default();

        if target.category == candidate.category {
            tally.reasons.push(reason::SAME_CATEGORY.to_owned());
        }

        if let Some(km) = report_distance_km(target, candidate) {
            let (score, label) = location_band(km);
            tally.add(LOCATION_WEIGHT, score);
            if let Some(prefix) = label {
                tally.reasons.push(format!("{prefix} ({km:.1}km)"));
            }
        }

        let title = text_similarity(&target.title, &candidate.title);
        tally.add(TITLE_WEIGHT, title);
        tally.note_if(title > REASON_THRESHOLD, reason::SIMILAR_TITLE);

        let description = text_similarity(&target.description, &candidate.description);
        tally.add(DESCRIPTION_WEIGHT, description);
        tally.note_if(description > REASON_THRESHOLD, reason::SIMILAR_DESCRIPTION);

        let tags = tag_overlap(&target.tags, &candidate.tags);
        tally.add(TAG_WEIGHT, tags);
        tally.note_if(tags > REASON_THRESHOLD, reason::MATCHING_TAGS);

        let hours = hours_between(target.reported_at, candidate.reported_at);
        let (score, same_day) = time_band(hours);
        tally.add(TIME_WEIGHT, score);
        tally.note_if(same_day, reason::SAME_DAY);

        tally.finish()
    }
}

#[derive(Debug, Default)]
struct Tally {
    weighted: f64,
    applied: f64,
    reasons: Vec<String>,
}

impl Tally {
    #[expect(
        clippy::float_arithmetic,
        reason = "weighted averages accumulate floating-point products"
    )]
    fn add(&mut self, weight: f64, score: f64) {
        self.weighted += score * weight;
        self.applied += weight;
    }

    fn note_if(&mut self, condition: bool, reason: &str) {
        if condition {
            self.reasons.push(reason.to_owned());
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "confidence is the weighted mean scaled to a percentage"
    )]
    fn finish(self) -> FeatureScore {
        let confidence = if self.applied > 0.0 {
            sanitise_confidence(self.weighted / self.applied * 100.0)
        } else {
            0.0
        };
        FeatureScore {
            confidence,
            reasons: self.reasons,
        }
    }
}

/// Map a distance to its location score and, for the closer bands, a
/// reason prefix.
fn location_band(km: f64) -> (f64, Option<&'static str>) {
    if km < 1.0 {
        (1.0, Some(reason::VERY_CLOSE))
    } else if km < 5.0 {
        (0.7, Some(reason::NEARBY))
    } else if km < 10.0 {
        (0.4, Some(reason::SAME_AREA))
    } else if km < 20.0 {
        (0.2, None)
    } else {
        (0.0, None)
    }
}

/// Map the gap between two reports to a recency score and whether they were
/// filed on the same day.
fn time_band(hours: f64) -> (f64, bool) {
    if hours < 24.0 {
        (1.0, true)
    } else if hours < 72.0 {
        (0.7, false)
    } else if hours < 168.0 {
        (0.4, false)
    } else {
        (0.2, false)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "convert a duration to fractional hours"
)]
fn hours_between(a: OffsetDateTime, b: OffsetDateTime) -> f64 {
    (a - b).abs().as_seconds_f64() / 3600.0
}

/// Clamp a confidence into `0.0..=100.0`, mapping non-finite values to
/// `0.0`.
#[must_use]
pub fn sanitise_confidence(confidence: f64) -> f64 {
    if !confidence.is_finite() {
        return 0.0;
    }
    confidence.clamp(0.0, 100.0)
}

/// Round a confidence to the nearest whole percentage.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is clamped to 0..=100 before the cast"
)]
#[must_use]
pub fn round_confidence(confidence: f64) -> u8 {
    sanitise_confidence(confidence).round() as u8
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "assertions compare floating point values"
)]
mod tests {
    use super::*;
    use findx_core::{Category, Disposition};
    use rstest::{fixture, rstest};
    use time::Duration;
    use time::macros::datetime;

    const TOLERANCE: f64 = 1e-9;

    #[fixture]
    fn lost() -> Report {
        Report::new(
            "lost-1",
            Disposition::Lost,
            Category::Item,
            datetime!(2024-05-01 10:00 UTC),
        )
    }

    #[fixture]
    fn found() -> Report {
        Report::new(
            "found-1",
            Disposition::Found,
            Category::Item,
            datetime!(2024-05-01 10:00 UTC),
        )
    }

    #[rstest]
    #[case(0.2, 1.0, Some(reason::VERY_CLOSE))]
    #[case(1.0, 0.7, Some(reason::NEARBY))]
    #[case(4.99, 0.7, Some(reason::NEARBY))]
    #[case(5.0, 0.4, Some(reason::SAME_AREA))]
    #[case(15.0, 0.2, None)]
    #[case(20.0, 0.0, None)]
    #[case(f64::NAN, 0.0, None)]
    fn location_bands(
        #[case] km: f64,
        #[case] expected: f64,
        #[case] label: Option<&'static str>,
    ) {
        let (score, actual) = location_band(km);
        assert!((score - expected).abs() < TOLERANCE);
        assert_eq!(actual, label);
    }

    #[rstest]
    #[case(0.0, 1.0, true)]
    #[case(23.9, 1.0, true)]
    #[case(24.0, 0.7, false)]
    #[case(100.0, 0.4, false)]
    #[case(168.0, 0.2, false)]
    fn time_bands(#[case] hours: f64, #[case] expected: f64, #[case] same_day: bool) {
        let (score, actual) = time_band(hours);
        assert!((score - expected).abs() < TOLERANCE);
        assert_eq!(actual, same_day);
    }

    #[rstest]
    fn hours_between_is_order_independent() {
        let a = datetime!(2024-05-01 10:00 UTC);
        let b = a + Duration::minutes(90);
        assert!((hours_between(a, b) - 1.5).abs() < TOLERANCE);
        assert!((hours_between(b, a) - 1.5).abs() < TOLERANCE);
    }

    #[rstest]
    fn empty_reports_filed_together_score_time_only(lost: Report, found: Report) {
        // No location: denominator is 75, only the time feature scores.
        let score = FeatureScorer.score(&lost, &found);
        assert!((score.confidence - 10.0 / 75.0 * 100.0).abs() < TOLERANCE);
        assert_eq!(
            score.reasons,
            vec![reason::SAME_CATEGORY.to_owned(), reason::SAME_DAY.to_owned()]
        );
    }

    #[rstest]
    fn repeated_tags_score_like_a_single_match(lost: Report, found: Report) {
        // Three copies of "dog" against one would overlap 3.0 uncapped, taking
        // the pair to 100. Capped at 1.0 it is tags (30) and time (10) of 75.
        let repeated = FeatureScorer.score(
            &lost.clone().with_tags(["dog", "dog", "dog"]),
            &found.clone().with_tags(["dog"]),
        );
        let single = FeatureScorer.score(&lost.with_tags(["dog"]), &found.with_tags(["dog"]));

        assert!((repeated.confidence - 40.0 / 75.0 * 100.0).abs() < TOLERANCE);
        assert_eq!(round_confidence(repeated.confidence), 53);
        assert_eq!(repeated, single);
    }

    #[rstest]
    fn missing_location_shrinks_the_denominator(lost: Report, found: Report) {
        let tagged_lost = lost.with_tags(["wallet", "leather"]);
        let tagged_found = found.with_tags(["wallet", "leather"]);

        let unlocated = FeatureScorer.score(&tagged_lost, &tagged_found);
        // tags 30 + time 10 out of 75.
        assert!((unlocated.confidence - 40.0 / 75.0 * 100.0).abs() < TOLERANCE);

        let far_apart = FeatureScorer.score(
            &tagged_lost.with_location(0.0, 0.0),
            &tagged_found.with_location(10.0, 10.0),
        );
        // Location applies but scores zero: 40 out of 100.
        assert!((far_apart.confidence - 40.0).abs() < TOLERANCE);
        assert!(unlocated.confidence > far_apart.confidence);
    }

    #[rstest]
    fn one_sided_location_is_skipped(lost: Report, found: Report) {
        let score = FeatureScorer.score(&lost.with_location(12.0, 77.0), &found);
        assert!((score.confidence - 10.0 / 75.0 * 100.0).abs() < TOLERANCE);
    }

    #[rstest]
    fn close_reports_cite_distance(lost: Report, found: Report) {
        let score = FeatureScorer.score(
            &lost.with_location(12.9716, 77.5946),
            &found.with_location(12.9716 + 0.0045, 77.5946),
        );
        assert!(score.reasons.contains(&"Very close (0.5km)".to_owned()));
    }

    #[rstest]
    fn reasons_follow_feature_order(lost: Report, found: Report) {
        let wallet_lost = lost
            .with_title("Black leather wallet")
            .with_description("Black leather wallet with cards")
            .with_tags(["wallet"])
            .with_location(51.5, -0.12);
        let wallet_found = found
            .with_title("Black leather wallet")
            .with_description("Black leather wallet with cards")
            .with_tags(["wallet"])
            .with_location(51.52, -0.12);

        let score = FeatureScorer.score(&wallet_lost, &wallet_found);
        assert_eq!(
            score.reasons,
            vec![
                reason::SAME_CATEGORY.to_owned(),
                "Nearby (2.2km)".to_owned(),
                reason::SIMILAR_TITLE.to_owned(),
                reason::SIMILAR_DESCRIPTION.to_owned(),
                reason::MATCHING_TAGS.to_owned(),
                reason::SAME_DAY.to_owned(),
            ]
        );
        // 0.7 × 25 + 20 + 15 + 30 + 10 out of 100.
        assert!((score.confidence - 92.5).abs() < TOLERANCE);
    }

    #[rstest]
    fn phone_left_near_a_library(lost: Report, found: Report) {
        let phone = lost
            .with_title("iPhone 15 Pro Max")
            .with_description("space black cracked screen blue case")
            .with_tags(["iphone", "apple", "phone", "space black", "cracked screen"])
            .with_location(12.9716, 77.5946);
        let sighting = found
            .with_title("iPhone Found Near Library")
            .with_description("space black iphone cracked screen")
            .with_tags(["iphone", "apple", "phone"])
            .with_location(12.9716 + 0.0045, 77.5946);

        let score = FeatureScorer.score(&phone, &sighting);
        // 25 + 20/6 + 15 × 4/7 + 30 + 10.
        assert_eq!(round_confidence(score.confidence), 77);
        assert_eq!(
            score.reasons,
            vec![
                reason::SAME_CATEGORY.to_owned(),
                "Very close (0.5km)".to_owned(),
                reason::SIMILAR_DESCRIPTION.to_owned(),
                reason::MATCHING_TAGS.to_owned(),
                reason::SAME_DAY.to_owned(),
            ]
        );
    }

    #[rstest]
    #[case(f64::NAN, 0.0)]
    #[case(f64::INFINITY, 0.0)]
    #[case(-3.0, 0.0)]
    #[case(130.0, 100.0)]
    #[case(55.5, 55.5)]
    fn sanitise_clamps_and_filters(#[case] input: f64, #[case] expected: f64) {
        assert!((sanitise_confidence(input) - expected).abs() < TOLERANCE);
    }

    #[rstest]
    #[case(30.49, 30)]
    #[case(30.5, 31)]
    #[case(99.6, 100)]
    #[case(250.0, 100)]
    #[case(f64::NAN, 0)]
    fn round_confidence_rounds_half_up(#[case] input: f64, #[case] expected: u8) {
        assert_eq!(round_confidence(input), expected);
    }
}
