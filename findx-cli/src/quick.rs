//! `quick` command: preview score for two reports.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use findx_matcher::quick_match_score;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::reports::{find_report, load_reports, require_existing};
use crate::{
    ARG_LEFT, ARG_REPORTS, ARG_RIGHT, CliError, ENV_QUICK_LEFT, ENV_QUICK_REPORTS,
    ENV_QUICK_RIGHT, write_json,
};

/// CLI arguments for the `quick` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "quick", about = "Print the quick preview score for two reports")]
#[ortho_config(prefix = "FINDX")]
pub(crate) struct QuickArgs {
    /// Path to a JSON file containing an array of reports.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) reports_path: Option<Utf8PathBuf>,
    /// Identifier of the first report.
    #[arg(long = ARG_LEFT, value_name = "id")]
    #[serde(default)]
    pub(crate) left: Option<String>,
    /// Identifier of the second report.
    #[arg(long = ARG_RIGHT, value_name = "id")]
    #[serde(default)]
    pub(crate) right: Option<String>,
}

/// Resolved `quick` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuickConfig {
    pub(crate) reports_path: Utf8PathBuf,
    pub(crate) left: String,
    pub(crate) right: String,
}

impl TryFrom<QuickArgs> for QuickConfig {
    type Error = CliError;

    fn try_from(args: QuickArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            reports_path: args.reports_path.ok_or(CliError::MissingArgument {
                field: ARG_REPORTS,
                env: ENV_QUICK_REPORTS,
            })?,
            left: args.left.ok_or(CliError::MissingArgument {
                field: ARG_LEFT,
                env: ENV_QUICK_LEFT,
            })?,
            right: args.right.ok_or(CliError::MissingArgument {
                field: ARG_RIGHT,
                env: ENV_QUICK_RIGHT,
            })?,
        })
    }
}

/// JSON payload printed by `quick`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct QuickOutput<'a> {
    pub(crate) left: &'a str,
    pub(crate) right: &'a str,
    pub(crate) score: u8,
}

pub(crate) fn run_quick_with(args: QuickArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = QuickConfig::try_from(merged)?;
    require_existing(&config.reports_path, ARG_REPORTS)?;
    execute_quick(&config, writer)
}

pub(crate) fn execute_quick(config: &QuickConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let reports = load_reports(&config.reports_path)?;
    let left = find_report(&reports, &config.left, &config.reports_path)?;
    let right = find_report(&reports, &config.right, &config.reports_path)?;

    write_json(
        writer,
        &QuickOutput {
            left: &left.id,
            right: &right.id,
            score: quick_match_score(left, right),
        },
    )
}
