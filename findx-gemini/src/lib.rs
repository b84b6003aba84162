//! Gemini-backed semantic similarity for the FindX match engine.
//!
//! [`GeminiSemanticSimilarity`] implements
//! [`findx_core::SemanticSimilarity`] by asking a Gemini model, through the
//! `generateContent` REST endpoint, whether a lost and a found report
//! describe the same subject.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use findx_gemini::{GeminiConfig, GeminiSemanticSimilarity};
//!
//! let config = GeminiConfig::new("api-key")
//!     .with_model("gemini-1.5-flash")
//!     .with_timeout(Duration::from_secs(15));
//! let semantic = GeminiSemanticSimilarity::with_config(config)?;
//! # Ok::<(), findx_gemini::ProviderBuildError>(())
//! ```

#![forbid(unsafe_code)]

mod api;
mod prompt;
mod provider;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_USER_AGENT, GeminiConfig, GeminiSemanticSimilarity,
    ProviderBuildError,
};
