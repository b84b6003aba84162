//! Token-set similarity between free-text fields.

use std::collections::HashSet;

/// Tokens of this many characters or fewer are noise and ignored.
const MIN_TOKEN_CHARS: usize = 2;

/// Lowercase `text` and split it into whitespace-separated words longer than
/// two characters, preserving order and duplicates.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_owned)
        .collect()
}

/// Jaccard-style similarity between two texts in `0.0..=1.0`.
///
/// The numerator counts every token of `left` (duplicates included) that
/// also occurs in `right`; the denominator counts the distinct tokens of
/// both texts. Repeated tokens on the left can push the raw ratio past one,
/// so the result is capped at `1.0`. Returns `0.0` when either text has no
/// qualifying token.
///
/// # Examples
/// ```
/// use findx_matcher::text_similarity;
///
/// assert_eq!(text_similarity("Black leather wallet", "black LEATHER wallet"), 1.0);
/// assert_eq!(text_similarity("a an of", "the"), 0.0);
/// ```
#[must_use]
pub fn text_similarity(left: &str, right: &str) -> f64 {
    let left_tokens = tokenize(left);
    let right_tokens = tokenize(right);
    if left_tokens.is_empty() || right_tokens.is_empty() {
        return 0.0;
    }

    let right_set: HashSet<&str> = right_tokens.iter().map(String::as_str).collect();
    let shared = left_tokens
        .iter()
        .filter(|token| right_set.contains(token.as_str()))
        .count();
    let union = left_tokens
        .iter()
        .chain(&right_tokens)
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .len();

    ratio(shared, union).min(1.0)
}

/// Divide two counts, resolving an empty denominator to `0.0`.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "similarity ratios of small token counts"
)]
pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
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
    fn tokenize_drops_short_words_and_lowercases() {
        assert_eq!(
            tokenize("My iPhone 15 Pro is at\tthe  Library"),
            vec!["iphone", "pro", "the", "library"]
        );
    }

    #[rstest]
    #[case("iPhone 15 Pro Max", "iPhone Found Near Library", 1.0 / 6.0)]
    #[case(
        "space black cracked screen blue case",
        "space black iphone cracked screen",
        4.0 / 7.0
    )]
    #[case("brown dog", "brown dog", 1.0)]
    #[case("brown dog", "white cat", 0.0)]
    #[case("", "brown dog", 0.0)]
    #[case("is a", "is a", 0.0)]
    fn similarity_cases(#[case] left: &str, #[case] right: &str, #[case] expected: f64) {
        assert!((text_similarity(left, right) - expected).abs() < TOLERANCE);
    }

    #[rstest]
    fn duplicates_on_the_left_count_every_time() {
        // left tokens: wallet, wallet, black; union: {wallet, black, leather}.
        let similarity = text_similarity("wallet wallet black", "wallet leather");
        assert!((similarity - 2.0 / 3.0).abs() < TOLERANCE);
    }

    #[rstest]
    fn repeated_left_tokens_cap_at_one() {
        assert!((text_similarity("wallet wallet", "wallet") - 1.0).abs() < TOLERANCE);
    }

    #[rstest]
    fn ratio_guards_empty_denominator() {
        assert!(ratio(3, 0).abs() < TOLERANCE);
    }
}
