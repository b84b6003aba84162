//! Match scoring for lost-and-found reports.
//!
//! [`MatchEngine`] filters a pool of reports down to plausible counterparts
//! of a target, scores each with [`FeatureScorer`], optionally blends in a
//! semantic backend's opinion, and returns a ranked list of
//! [`findx_core::MatchCandidate`] values. [`quick_match_score`] offers a
//! cheaper synchronous estimate for previews.
//!
//! The building blocks are exposed too:
//!
//! - [`haversine_km`] for great-circle distance.
//! - [`text_similarity`] for token-set similarity of free text.
//! - [`tag_overlap`] for case-insensitive tag overlap.

#![forbid(unsafe_code)]

mod distance;
mod engine;
mod features;
mod quick;
mod tags;
mod text;

pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use engine::{MIN_CONFIDENCE, MatchEngine, MatchOptions};
pub use features::{FeatureScore, FeatureScorer, reason, round_confidence, sanitise_confidence};
pub use quick::quick_match_score;
pub use tags::tag_overlap;
pub use text::text_similarity;
