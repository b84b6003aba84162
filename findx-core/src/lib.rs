//! Core domain types for the FindX match engine.
//!
//! Reports are read-only snapshots supplied by the host application. The
//! engine scores them against each other and hands back transient
//! [`MatchCandidate`] values; nothing here is persisted.
//!
//! The optional semantic-similarity capability is modelled as the
//! [`SemanticSimilarity`] trait so hosts can inject a remote model, a stub,
//! or nothing at all.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod candidate;
pub mod report;
pub mod semantic;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use candidate::MatchCandidate;
pub use report::{Category, Disposition, ParseEnumError, Report, ReportStatus};
pub use semantic::{
    DisabledSemanticSimilarity, ReportSummary, SemanticError, SemanticSimilarity, SemanticVerdict,
};
