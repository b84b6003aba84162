//! Judge whether two reports describe the same subject using an external
//! model.
//!
//! The [`SemanticSimilarity`] trait abstracts the remote capability. Callers
//! pass a [`ReportSummary`] for the lost and the found report and receive a
//! [`SemanticVerdict`]. Every failure is reported as a [`SemanticError`];
//! the match engine treats all of them as soft failures.

mod error;
mod provider;

pub use error::SemanticError;
pub use provider::{DisabledSemanticSimilarity, ReportSummary, SemanticSimilarity, SemanticVerdict};
