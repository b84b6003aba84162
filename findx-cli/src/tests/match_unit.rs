//! Focused unit tests covering match CLI configuration and execution.

use std::time::Duration;

use camino::Utf8PathBuf;
use findx_core::test_support::StubSemanticSimilarity;
use findx_core::{DisabledSemanticSimilarity, SemanticSimilarity};
use findx_matcher::MatchOptions;
use rstest::rstest;

use super::helpers::{ReportsFile, output_json};
use super::*;
use crate::matching::{GeminiSettings, MatchConfig, config_from_layers_for_test, execute_match};
use crate::{ENV_GEMINI_API_KEY, ENV_MATCH_REPORTS, ENV_MATCH_TARGET};

/// Builder handing out a stub backend with a fixed confidence.
struct StubBuilder(f64);

impl SemanticBuilder for StubBuilder {
    fn build(&self, _config: &MatchConfig) -> Result<Box<dyn SemanticSimilarity>, CliError> {
        Ok(Box::new(StubSemanticSimilarity::with_confidence(self.0)))
    }
}

struct LocalBuilder;

impl SemanticBuilder for LocalBuilder {
    fn build(&self, _config: &MatchConfig) -> Result<Box<dyn SemanticSimilarity>, CliError> {
        Ok(Box::new(DisabledSemanticSimilarity))
    }
}

fn local_config(file: &ReportsFile, target: &str) -> MatchConfig {
    MatchConfig {
        reports_path: file.path().to_path_buf(),
        target: target.to_owned(),
        gemini: None,
        options: MatchOptions::default(),
    }
}

#[rstest]
#[case(None, Some("t"), ARG_REPORTS, ENV_MATCH_REPORTS)]
#[case(Some("reports.json"), None, ARG_TARGET, ENV_MATCH_TARGET)]
fn converting_without_required_fields_errors(
    #[case] reports: Option<&str>,
    #[case] target: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = MatchArgs {
        reports_path: reports.map(Utf8PathBuf::from),
        target: target.map(str::to_owned),
        ..MatchArgs::default()
    };
    let err = MatchConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn semantic_without_api_key_errors() {
    let args = MatchArgs {
        reports_path: Some(Utf8PathBuf::from("reports.json")),
        target: Some("lost-wallet".to_owned()),
        semantic: Some(true),
        ..MatchArgs::default()
    };
    let err = MatchConfig::try_from(args).expect_err("semantic needs a key");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_GEMINI_API_KEY);
            assert_eq!(env, ENV_GEMINI_API_KEY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn defaults_apply_when_options_are_absent() {
    let args = MatchArgs {
        reports_path: Some(Utf8PathBuf::from("reports.json")),
        target: Some("lost-wallet".to_owned()),
        gemini_api_key: Some("unused".to_owned()),
        ..MatchArgs::default()
    };
    let config = MatchConfig::try_from(args).expect("config should build");
    assert!(!config.use_semantic());
    assert_eq!(config.gemini, None);
    assert_eq!(config.options, MatchOptions::default());
}

#[rstest]
fn semantic_settings_and_tuning_are_carried() {
    let args = MatchArgs {
        reports_path: Some(Utf8PathBuf::from("reports.json")),
        target: Some("lost-wallet".to_owned()),
        semantic: Some(true),
        gemini_api_key: Some("key".to_owned()),
        gemini_model: None,
        semantic_timeout_secs: Some(3),
        concurrency: Some(2),
    };
    let config = MatchConfig::try_from(args).expect("config should build");
    assert_eq!(
        config.gemini,
        Some(GeminiSettings {
            api_key: "key".to_owned(),
            model: findx_gemini::DEFAULT_MODEL.to_owned(),
        })
    );
    assert_eq!(config.options.semantic_timeout, Duration::from_secs(3));
    assert_eq!(config.options.concurrency, 2);
}

#[rstest]
fn invalid_layer_maps_to_configuration_error() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "concurrency": "many" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "target": "from-file",
            "gemini_model": "gemini-from-file",
            "semantic_timeout_secs": 7,
        }),
        None,
    );
    composer.push_environment(json!({
        "target": "from-env",
        "gemini_api_key": "env-key",
    }));
    composer.push_cli(json!({
        "reports_path": "reports.json",
        "semantic": true,
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.reports_path, Utf8PathBuf::from("reports.json"));
    assert_eq!(config.target, "from-env");
    assert_eq!(
        config.gemini,
        Some(GeminiSettings {
            api_key: "env-key".to_owned(),
            model: "gemini-from-file".to_owned(),
        })
    );
    assert_eq!(config.options.semantic_timeout, Duration::from_secs(7));
}

#[rstest]
fn validate_sources_reports_missing_file() {
    let file = ReportsFile::sample();
    let mut config = local_config(&file, "lost-wallet");
    config.reports_path = file.root().join("absent.json");

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_REPORTS),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let file = ReportsFile::sample();
    let mut config = local_config(&file, "lost-wallet");
    config.reports_path = file.root().to_path_buf();

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_REPORTS),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn execute_match_prints_ranked_candidates() {
    let file = ReportsFile::sample();
    let config = local_config(&file, "lost-wallet");
    let mut buffer = Vec::new();

    execute_match(&config, &LocalBuilder, &mut buffer).expect("match should succeed");

    let output = output_json(&buffer);
    let matches = output.as_array().expect("array output");
    assert_eq!(matches.len(), 1);
    let top = matches.first().expect("one match");
    assert_eq!(top["report"]["id"], "found-wallet");
    assert_eq!(top["confidence"], 91);
    let reasons = top["reasons"].as_array().expect("reasons array");
    assert!(reasons.iter().any(|r| r == "Matching AI tags"));
    assert!(!reasons.iter().any(|r| r == "AI high confidence"));
}

#[rstest]
fn execute_match_blends_semantic_opinion() {
    let file = ReportsFile::sample();
    let mut config = local_config(&file, "lost-wallet");
    config.gemini = Some(GeminiSettings {
        api_key: "key".to_owned(),
        model: "stub".to_owned(),
    });
    let mut buffer = Vec::new();

    execute_match(&config, &StubBuilder(90.0), &mut buffer).expect("match should succeed");

    let output = output_json(&buffer);
    let top = output.get(0).expect("one match");
    assert_eq!(top["confidence"], 90);
    let reasons = top["reasons"].as_array().expect("reasons array");
    assert!(reasons.iter().any(|r| r == "AI high confidence"));
}

#[rstest]
fn unknown_target_is_reported() {
    let file = ReportsFile::sample();
    let config = local_config(&file, "missing-id");
    let mut buffer = Vec::new();

    let err = execute_match(&config, &LocalBuilder, &mut buffer).expect_err("unknown id");
    match err {
        CliError::UnknownReport { id, .. } => assert_eq!(id, "missing-id"),
        other => panic!("expected UnknownReport, found {other:?}"),
    }
    assert!(buffer.is_empty());
}

#[rstest]
fn malformed_reports_are_reported() {
    let file = ReportsFile::with_contents(r#"{ "not": "an array" }"#);
    let config = local_config(&file, "lost-wallet");
    let mut buffer = Vec::new();

    let err = execute_match(&config, &LocalBuilder, &mut buffer).expect_err("bad JSON");
    assert!(matches!(err, CliError::ParseReports { .. }));
}

#[rstest]
fn default_builder_is_local_without_gemini_settings() {
    let file = ReportsFile::sample();
    let config = local_config(&file, "lost-wallet");
    let mut buffer = Vec::new();

    execute_match(&config, &DefaultSemanticBuilder, &mut buffer).expect("match should succeed");
    assert_eq!(output_json(&buffer).as_array().map(Vec::len), Some(1));
}
