//! Facade crate for the FindX lost-and-found matching engine.
//!
//! This crate re-exports the core report types and the matcher, and exposes
//! the Gemini semantic provider behind the `gemini` feature flag.

#![forbid(unsafe_code)]

pub use findx_core::{
    Category, DisabledSemanticSimilarity, Disposition, MatchCandidate, ParseEnumError, Report,
    ReportStatus, ReportSummary, SemanticError, SemanticSimilarity, SemanticVerdict,
};

#[cfg(feature = "test-support")]
pub use findx_core::test_support;

pub use findx_matcher::{
    FeatureScore, FeatureScorer, MIN_CONFIDENCE, MatchEngine, MatchOptions, haversine_km,
    quick_match_score, reason, tag_overlap, text_similarity,
};

#[cfg(feature = "gemini")]
pub use findx_gemini::{GeminiConfig, GeminiSemanticSimilarity, ProviderBuildError};
