//! Overlap between tag lists.

use std::collections::HashSet;

use crate::text::ratio;

/// Share of the smaller tag list found in the other, in `0.0..=1.0`.
///
/// Tags compare case-insensitively. The numerator counts every entry of
/// `left` present in `right`; the denominator is the length of the shorter
/// list, so a sparse list fully contained in a rich one scores `1.0`.
/// Returns `0.0` when either list is empty.
///
/// # Examples
/// ```
/// use findx_matcher::tag_overlap;
///
/// let lost = ["iPhone", "apple", "phone", "space black"];
/// let found = ["iphone", "Apple"];
/// assert_eq!(tag_overlap(&lost, &found), 1.0);
/// assert_eq!(tag_overlap::<&str, &str>(&[], &found), 0.0);
/// ```
#[must_use]
pub fn tag_overlap<L, R>(left: &[L], right: &[R]) -> f64
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let right_set: HashSet<String> = right.iter().map(|t| t.as_ref().to_lowercase()).collect();
    let shared = left
        .iter()
        .filter(|t| right_set.contains(&t.as_ref().to_lowercase()))
        .count();

    ratio(shared, left.len().min(right.len())).min(1.0)
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "assertions compare floating point values"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TOLERANCE: f64 = 1e-9;

    #[rstest]
    #[case(&["iphone", "apple", "phone", "space black", "cracked screen"], &["iphone", "apple", "phone"], 1.0)]
    #[case(&["iphone", "apple", "phone"], &["iphone", "samsung", "case", "blue"], 1.0 / 3.0)]
    #[case(&["Beagle", "DOG"], &["beagle", "dog"], 1.0)]
    #[case(&["cat"], &["dog"], 0.0)]
    #[case(&[], &["dog"], 0.0)]
    #[case(&["dog"], &[], 0.0)]
    fn overlap_cases(#[case] left: &[&str], #[case] right: &[&str], #[case] expected: f64) {
        assert!((tag_overlap(left, right) - expected).abs() < TOLERANCE);
    }

    #[rstest]
    fn denominator_is_the_shorter_list() {
        // Two of four left tags appear on the right, but the right only has two.
        let overlap = tag_overlap(&["a1", "b2", "c3", "d4"], &["a1", "b2"]);
        assert!((overlap - 1.0).abs() < TOLERANCE);
        let reversed = tag_overlap(&["a1", "x9"], &["a1", "b2", "c3", "d4"]);
        assert!((reversed - 0.5).abs() < TOLERANCE);
    }

    #[rstest]
    fn duplicate_left_tags_cap_at_one() {
        assert!((tag_overlap(&["dog", "dog"], &["dog"]) - 1.0).abs() < TOLERANCE);
    }
}
