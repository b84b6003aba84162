//! Error types emitted by the FindX CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use findx_gemini::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the FindX CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the reports file failed.
    #[error("failed to open reports at {path:?}: {source}")]
    OpenReports {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The reports file is not a JSON array of reports.
    #[error("failed to parse reports JSON at {path:?}: {source}")]
    ParseReports {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// No report in the file carries the requested identifier.
    #[error("no report with id {id:?} in {path:?}")]
    UnknownReport { id: String, path: Utf8PathBuf },
    /// Constructing the Gemini client failed.
    #[error("failed to build semantic provider: {0}")]
    BuildSemanticProvider(#[source] ProviderBuildError),
    /// Constructing the async runtime failed.
    #[error("failed to build async runtime: {0}")]
    BuildRuntime(#[source] std::io::Error),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
