//! Argument parsing for the top-level command.

use camino::Utf8PathBuf;
use clap::Parser;
use rstest::rstest;

use super::helpers::{ReportsFile, output_json};
use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("arguments should parse")
}

#[rstest]
#[case(&["findx", "match", "r.json", "--target", "t"], None)]
#[case(&["findx", "match", "r.json", "--target", "t", "--semantic"], Some(true))]
#[case(&["findx", "match", "r.json", "--target", "t", "--semantic=false"], Some(false))]
fn semantic_flag_accepts_optional_value(#[case] args: &[&str], #[case] expected: Option<bool>) {
    match parse(args).command {
        Command::Match(parsed) => {
            assert_eq!(parsed.semantic, expected);
            assert_eq!(parsed.target.as_deref(), Some("t"));
            assert_eq!(parsed.reports_path, Some(Utf8PathBuf::from("r.json")));
        }
        other => panic!("expected match command, found {other:?}"),
    }
}

#[rstest]
fn match_tuning_flags_parse() {
    let cli = parse(&[
        "findx",
        "match",
        "r.json",
        "--target",
        "t",
        "--gemini-model",
        "gemini-pro",
        "--semantic-timeout-secs",
        "4",
        "--concurrency",
        "8",
    ]);
    match cli.command {
        Command::Match(parsed) => {
            assert_eq!(parsed.gemini_model.as_deref(), Some("gemini-pro"));
            assert_eq!(parsed.semantic_timeout_secs, Some(4));
            assert_eq!(parsed.concurrency, Some(8));
        }
        other => panic!("expected match command, found {other:?}"),
    }
}

#[rstest]
fn quick_flags_parse() {
    match parse(&["findx", "quick", "r.json", "--left", "a", "--right", "b"]).command {
        Command::Quick(parsed) => {
            assert_eq!(parsed.left.as_deref(), Some("a"));
            assert_eq!(parsed.right.as_deref(), Some("b"));
        }
        other => panic!("expected quick command, found {other:?}"),
    }
}

#[rstest]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["findx", "solve"]).is_err());
}

#[rstest]
fn dispatch_runs_quick_against_a_file() {
    let file = ReportsFile::sample();
    let cli = parse(&[
        "findx",
        "quick",
        file.path().as_str(),
        "--left",
        "lost-wallet",
        "--right",
        "found-wallet",
    ]);
    let mut buffer = Vec::new();

    dispatch(cli, &DefaultSemanticBuilder, &mut buffer).expect("quick should run");
    assert_eq!(output_json(&buffer)["score"], 100);
}
