//! Command-line interface for scoring lost-and-found reports offline.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};

mod error;
mod matching;
mod quick;
mod reports;

pub use error::CliError;

use matching::{DefaultSemanticBuilder, MatchArgs, SemanticBuilder, run_match_with};
use quick::{QuickArgs, run_quick_with};

pub(crate) const ARG_REPORTS: &str = "reports";
pub(crate) const ARG_TARGET: &str = "target";
pub(crate) const ARG_GEMINI_API_KEY: &str = "gemini-api-key";
pub(crate) const ARG_GEMINI_MODEL: &str = "gemini-model";
pub(crate) const ARG_SEMANTIC: &str = "semantic";
pub(crate) const ARG_SEMANTIC_TIMEOUT_SECS: &str = "semantic-timeout-secs";
pub(crate) const ARG_CONCURRENCY: &str = "concurrency";
pub(crate) const ARG_LEFT: &str = "left";
pub(crate) const ARG_RIGHT: &str = "right";
pub(crate) const ENV_MATCH_REPORTS: &str = "FINDX_CMDS_MATCH_REPORTS_PATH";
pub(crate) const ENV_MATCH_TARGET: &str = "FINDX_CMDS_MATCH_TARGET";
pub(crate) const ENV_GEMINI_API_KEY: &str = "FINDX_CMDS_MATCH_GEMINI_API_KEY";
pub(crate) const ENV_QUICK_REPORTS: &str = "FINDX_CMDS_QUICK_REPORTS_PATH";
pub(crate) const ENV_QUICK_LEFT: &str = "FINDX_CMDS_QUICK_LEFT";
pub(crate) const ENV_QUICK_RIGHT: &str = "FINDX_CMDS_QUICK_RIGHT";

/// Run the FindX CLI with the current process arguments and environment.
///
/// Results are written to standard output as pretty-printed JSON.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments or configuration are invalid, the
/// reports file cannot be read, or output cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli, &DefaultSemanticBuilder, &mut stdout)
}

fn dispatch(
    cli: Cli,
    builder: &dyn SemanticBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match cli.command {
        Command::Match(args) => run_match_with(args, builder, writer),
        Command::Quick(args) => run_quick_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "findx",
    about = "Score lost-and-found reports against each other",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank every plausible counterpart of one report.
    Match(MatchArgs),
    /// Print the quick preview score for two reports.
    Quick(QuickArgs),
}

/// Serialise `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: serde::Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
