//! Lightweight synchronous pair score for previews.

use findx_core::Report;

use crate::distance::report_distance_km;
use crate::features::round_confidence;
use crate::tags::tag_overlap;
use crate::text::text_similarity;

const TAG_POINTS: f64 = 60.0;
const TITLE_POINTS: f64 = 25.0;

/// Score two reports without semantic help or eligibility filtering beyond
/// disposition and category.
///
/// Returns `0` when both reports share a disposition or their categories
/// differ. Otherwise the result is `tag_overlap × 60 + title_similarity ×
/// 25` plus a location bonus of 15, 10, or 5 points for reports under 5, 10,
/// or 20 km apart. The sum is not normalised.
///
/// # Examples
/// ```
/// use findx_core::{Category, Disposition, Report};
/// use findx_matcher::quick_match_score;
/// use time::macros::datetime;
///
/// let at = datetime!(2024-05-01 10:00 UTC);
/// let lost = Report::new("1", Disposition::Lost, Category::Item, at).with_tags(["wallet"]);
/// let found = Report::new("2", Disposition::Found, Category::Item, at).with_tags(["wallet"]);
/// assert_eq!(quick_match_score(&lost, &found), 60);
/// assert_eq!(quick_match_score(&lost, &lost), 0);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "fixed-weight sum of similarity scores"
)]
#[must_use]
pub fn quick_match_score(a: &Report, b: &Report) -> u8 {
    if a.disposition == b.disposition || a.category != b.category {
        return 0;
    }

    let score = tag_overlap(&a.tags, &b.tags) * TAG_POINTS
        + text_similarity(&a.title, &b.title) * TITLE_POINTS
        + location_bonus(report_distance_km(a, b));
    round_confidence(score)
}

fn location_bonus(distance_km: Option<f64>) -> f64 {
    match distance_km {
        Some(km) if km < 5.0 => 15.0,
        Some(km) if km < 10.0 => 10.0,
        Some(km) if km < 20.0 => 5.0,
        _ => 0.0,
    }
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
    use time::macros::datetime;

    #[fixture]
    fn wallet_pair() -> (Report, Report) {
        let at = datetime!(2024-05-01 10:00 UTC);
        let lost = Report::new("lost", Disposition::Lost, Category::Item, at)
            .with_title("Black leather wallet")
            .with_tags(["wallet", "leather", "black"])
            .with_location(51.5072, -0.1276);
        let found = Report::new("found", Disposition::Found, Category::Item, at)
            .with_title("Black leather wallet")
            .with_tags(["wallet", "leather", "black"])
            .with_location(51.5072, -0.1276);
        (lost, found)
    }

    #[rstest]
    #[case(Some(0.0), 15.0)]
    #[case(Some(4.9), 15.0)]
    #[case(Some(5.0), 10.0)]
    #[case(Some(19.9), 5.0)]
    #[case(Some(20.0), 0.0)]
    #[case(None, 0.0)]
    fn location_bonus_bands(#[case] km: Option<f64>, #[case] expected: f64) {
        assert!((location_bonus(km) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn identical_pair_scores_full_marks(wallet_pair: (Report, Report)) {
        let (lost, found) = wallet_pair;
        assert_eq!(quick_match_score(&lost, &found), 100);
        assert_eq!(quick_match_score(&found, &lost), 100);
    }

    #[rstest]
    fn same_disposition_scores_zero(wallet_pair: (Report, Report)) {
        let (lost, _) = wallet_pair;
        assert_eq!(quick_match_score(&lost, &lost.clone()), 0);
    }

    #[rstest]
    fn different_category_scores_zero(wallet_pair: (Report, Report)) {
        let (lost, mut found) = wallet_pair;
        found.category = Category::Pet;
        assert_eq!(quick_match_score(&lost, &found), 0);
    }

    #[rstest]
    fn missing_location_forfeits_the_bonus(wallet_pair: (Report, Report)) {
        let (lost, mut found) = wallet_pair;
        found.location = None;
        assert_eq!(quick_match_score(&lost, &found), 85);
    }

    #[rstest]
    fn partial_overlap_is_not_normalised() {
        let at = datetime!(2024-05-01 10:00 UTC);
        let lost = Report::new("l", Disposition::Lost, Category::Pet, at)
            .with_title("Brown beagle puppy")
            .with_tags(["beagle", "brown"]);
        let found = Report::new("f", Disposition::Found, Category::Pet, at)
            .with_title("Beagle found")
            .with_tags(["beagle", "collar", "small"]);
        // tags 1/2 × 60 = 30; title 1/4 × 25 = 6.25; no bonus.
        assert_eq!(quick_match_score(&lost, &found), 36);
    }
}
