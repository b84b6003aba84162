//! `match` command: rank a report's counterparts from a JSON pool.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use findx_core::{DisabledSemanticSimilarity, SemanticSimilarity};
use findx_gemini::{DEFAULT_MODEL, GeminiConfig, GeminiSemanticSimilarity};
use findx_matcher::{MatchEngine, MatchOptions};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::reports::{find_report, load_reports, require_existing};
use crate::{
    ARG_CONCURRENCY, ARG_GEMINI_API_KEY, ARG_GEMINI_MODEL, ARG_REPORTS, ARG_SEMANTIC,
    ARG_SEMANTIC_TIMEOUT_SECS, ARG_TARGET, CliError, ENV_GEMINI_API_KEY, ENV_MATCH_REPORTS,
    ENV_MATCH_TARGET, write_json,
};

/// CLI arguments for the `match` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "match",
    long_about = "Load a JSON array of reports, pick the target by id, and \
                 print its ranked counterparts. Semantic augmentation asks \
                 Gemini for a second opinion on promising candidates and \
                 needs an API key.",
    about = "Rank the counterparts of one report"
)]
#[ortho_config(prefix = "FINDX")]
pub(crate) struct MatchArgs {
    /// Path to a JSON file containing an array of reports.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) reports_path: Option<Utf8PathBuf>,
    /// Identifier of the report to find matches for.
    #[arg(long = ARG_TARGET, value_name = "id")]
    #[serde(default)]
    pub(crate) target: Option<String>,
    /// Blend in Gemini's judgement for promising candidates.
    #[arg(
        long = ARG_SEMANTIC,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) semantic: Option<bool>,
    /// Gemini API key.
    #[arg(long = ARG_GEMINI_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) gemini_api_key: Option<String>,
    /// Gemini model name.
    #[arg(long = ARG_GEMINI_MODEL, value_name = "model")]
    #[serde(default)]
    pub(crate) gemini_model: Option<String>,
    /// Per-candidate semantic timeout in seconds.
    #[arg(long = ARG_SEMANTIC_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) semantic_timeout_secs: Option<u64>,
    /// Maximum number of semantic comparisons in flight.
    #[arg(long = ARG_CONCURRENCY, value_name = "n")]
    #[serde(default)]
    pub(crate) concurrency: Option<usize>,
}

impl MatchArgs {
    pub(crate) fn into_config(self) -> Result<MatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatchConfig::try_from(merged)
    }
}

/// Resolved `match` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchConfig {
    pub(crate) reports_path: Utf8PathBuf,
    pub(crate) target: String,
    /// Present only when semantic augmentation is requested.
    pub(crate) gemini: Option<GeminiSettings>,
    pub(crate) options: MatchOptions,
}

/// Gemini settings for an augmented run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GeminiSettings {
    pub(crate) api_key: String,
    pub(crate) model: String,
}

impl MatchConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.reports_path, ARG_REPORTS)
    }

    pub(crate) const fn use_semantic(&self) -> bool {
        self.gemini.is_some()
    }
}

impl TryFrom<MatchArgs> for MatchConfig {
    type Error = CliError;

    fn try_from(args: MatchArgs) -> Result<Self, Self::Error> {
        let reports_path = args.reports_path.ok_or(CliError::MissingArgument {
            field: ARG_REPORTS,
            env: ENV_MATCH_REPORTS,
        })?;
        let target = args.target.ok_or(CliError::MissingArgument {
            field: ARG_TARGET,
            env: ENV_MATCH_TARGET,
        })?;

        let gemini = if args.semantic.unwrap_or(false) {
            let api_key = args.gemini_api_key.ok_or(CliError::MissingArgument {
                field: ARG_GEMINI_API_KEY,
                env: ENV_GEMINI_API_KEY,
            })?;
            Some(GeminiSettings {
                api_key,
                model: args
                    .gemini_model
                    .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            })
        } else {
            None
        };

        let defaults = MatchOptions::default();
        let options = MatchOptions {
            semantic_timeout: args
                .semantic_timeout_secs
                .map_or(defaults.semantic_timeout, Duration::from_secs),
            concurrency: args.concurrency.unwrap_or(defaults.concurrency),
        };

        Ok(Self {
            reports_path,
            target,
            gemini,
            options,
        })
    }
}

/// Builds the semantic backend for the current `match` invocation.
pub(crate) trait SemanticBuilder {
    fn build(&self, config: &MatchConfig) -> Result<Box<dyn SemanticSimilarity>, CliError>;
}

pub(crate) struct DefaultSemanticBuilder;

impl SemanticBuilder for DefaultSemanticBuilder {
    fn build(&self, config: &MatchConfig) -> Result<Box<dyn SemanticSimilarity>, CliError> {
        let Some(settings) = &config.gemini else {
            return Ok(Box::new(DisabledSemanticSimilarity));
        };
        let provider = GeminiSemanticSimilarity::with_config(
            GeminiConfig::new(settings.api_key.clone()).with_model(settings.model.clone()),
        )
        .map_err(CliError::BuildSemanticProvider)?;
        Ok(Box::new(provider))
    }
}

pub(crate) fn run_match_with(
    args: MatchArgs,
    builder: &dyn SemanticBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_match(&config, builder, writer)
}

pub(crate) fn execute_match(
    config: &MatchConfig,
    builder: &dyn SemanticBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let reports = load_reports(&config.reports_path)?;
    let target = find_report(&reports, &config.target, &config.reports_path)?;
    let engine = MatchEngine::new(builder.build(config)?).with_options(config.options);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::BuildRuntime)?;
    let matches = runtime.block_on(engine.find_matches(target, &reports, config.use_semantic()));
    log::info!("report {}: {} matches", target.id, matches.len());

    write_json(writer, &matches)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<MatchConfig, CliError> {
    let merged = MatchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    MatchConfig::try_from(merged)
}
