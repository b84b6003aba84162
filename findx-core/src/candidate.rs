//! Ranked match output handed back to the host.

use crate::Report;

/// A candidate report paired with a confidence score and its explanations.
///
/// Candidates borrow the report from the caller's pool; they are built per
/// request and never persisted by the engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MatchCandidate<'a> {
    /// The candidate report.
    pub report: &'a Report,
    /// Estimated likelihood, `0..=100`, that both reports describe the same
    /// subject.
    pub confidence: u8,
    /// Human-readable explanations in the order they were established.
    pub reasons: Vec<String>,
}

impl<'a> MatchCandidate<'a> {
    /// Pair a report with its rounded confidence and reasons.
    #[must_use]
    pub const fn new(report: &'a Report, confidence: u8, reasons: Vec<String>) -> Self {
        Self {
            report,
            confidence,
            reasons,
        }
    }

    /// Report whether `reason` was recorded for this candidate.
    ///
    /// Matches on prefix so distance-bearing reasons such as
    /// `"Very close (0.5km)"` can be checked without the distance.
    #[must_use]
    pub fn has_reason(&self, reason: &str) -> bool {
        self.reasons.iter().any(|r| r.starts_with(reason))
    }
}
