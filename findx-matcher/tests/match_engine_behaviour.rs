#![expect(
    clippy::expect_used,
    clippy::float_arithmetic,
    reason = "tests should fail fast when setup breaks and offset coordinates"
)]

//! Behavioural coverage for ranking candidates with the match engine.

use std::cell::RefCell;
use std::time::Duration;

use async_trait::async_trait;
use findx_core::test_support::StubSemanticSimilarity;
use findx_core::{
    Category, DisabledSemanticSimilarity, Disposition, Report, ReportSummary, SemanticError,
    SemanticSimilarity, SemanticVerdict,
};
use findx_matcher::{MatchEngine, MatchOptions, reason};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use time::macros::datetime;
use time::{Duration as Span, OffsetDateTime};

const REPORTED_AT: OffsetDateTime = datetime!(2024-05-01 10:00 UTC);
const FOUND_ID: &str = "found-iphone";
const BROKEN_ID: &str = "found-iphone-broken";
const BROKEN_TITLE: &str = "Broken iPhone listing";

/// Semantic backend that sleeps far longer than any test timeout.
struct SilentSemantic;

#[async_trait]
impl SemanticSimilarity for SilentSemantic {
    async fn compare(
        &self,
        _lost: &ReportSummary<'_>,
        _found: &ReportSummary<'_>,
    ) -> Result<SemanticVerdict, SemanticError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(SemanticVerdict::new(100.0, Vec::new()))
    }
}

/// A ranked match detached from the pool it borrowed from.
#[derive(Debug, Clone)]
struct Ranked {
    id: String,
    confidence: u8,
    reasons: Vec<String>,
}

/// Shared state for one scenario run.
pub struct EngineContext {
    target: RefCell<Option<Report>>,
    pool: RefCell<Vec<Report>>,
    backend: RefCell<Option<Box<dyn SemanticSimilarity>>>,
    results: RefCell<Vec<Ranked>>,
}

#[fixture]
/// Build a fresh `EngineContext` for each scenario run.
pub fn context() -> EngineContext {
    EngineContext {
        target: RefCell::new(None),
        pool: RefCell::new(Vec::new()),
        backend: RefCell::new(None),
        results: RefCell::new(Vec::new()),
    }
}

fn lost_iphone() -> Report {
    Report::new("lost-iphone", Disposition::Lost, Category::Item, REPORTED_AT)
        .with_title("iPhone 15 Pro Max")
        .with_description("space black cracked screen blue case")
        .with_tags(["iphone", "apple", "phone", "space black", "cracked screen"])
        .with_location(12.9716, 77.5946)
}

fn found_iphone() -> Report {
    Report::new(
        FOUND_ID,
        Disposition::Found,
        Category::Item,
        REPORTED_AT + Span::minutes(20),
    )
    .with_title("iPhone Found Near Library")
    .with_description("space black iphone cracked screen")
    .with_tags(["iphone", "apple", "phone"])
    .with_location(12.9716 + 0.0045, 77.5946)
}

fn find(context: &EngineContext, use_semantic: bool) {
    let target = context.target.borrow().clone().expect("target report");
    let pool = context.pool.borrow();
    let backend: Box<dyn SemanticSimilarity> = context
        .backend
        .borrow_mut()
        .take()
        .unwrap_or_else(|| Box::new(DisabledSemanticSimilarity));
    let engine = MatchEngine::new(backend).with_options(
        MatchOptions::default().with_semantic_timeout(Duration::from_millis(50)),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let matches = runtime.block_on(engine.find_matches(&target, &pool, use_semantic));
    *context.results.borrow_mut() = matches
        .into_iter()
        .map(|m| Ranked {
            id: m.report.id.clone(),
            confidence: m.confidence,
            reasons: m.reasons,
        })
        .collect();
}

fn ranked(context: &EngineContext, id: &str) -> Ranked {
    context
        .results
        .borrow()
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .expect("candidate should be ranked")
}

#[given("a lost iPhone report in Bengaluru")]
fn lost_iphone_target(context: &EngineContext) {
    *context.target.borrow_mut() = Some(lost_iphone());
}

#[given("a found iPhone report half a kilometre away twenty minutes later")]
fn nearby_found_iphone(context: &EngineContext) {
    context.pool.borrow_mut().push(found_iphone());
}

#[given("an identical report that is also lost")]
fn identical_lost_report(context: &EngineContext) {
    let mut twin = lost_iphone();
    twin.id = "lost-twin".to_owned();
    context.pool.borrow_mut().push(twin);
}

#[given("an unrelated found item 500 km away a month later")]
fn distant_unrelated_item(context: &EngineContext) {
    let stranger = Report::new(
        "found-umbrella",
        Disposition::Found,
        Category::Item,
        REPORTED_AT + Span::days(30),
    )
    .with_title("Green umbrella")
    .with_description("folding golf umbrella")
    .with_tags(["umbrella"])
    .with_location(12.9716 + 4.5, 77.5946);
    context.pool.borrow_mut().push(stranger);
}

#[given("a second found iPhone whose semantic comparison fails")]
fn broken_found_iphone(context: &EngineContext) {
    let mut broken = found_iphone().with_title(BROKEN_TITLE);
    broken.id = BROKEN_ID.to_owned();
    context.pool.borrow_mut().push(broken);
    let stub = StubSemanticSimilarity::with_confidence(90.0).failing_for(
        BROKEN_TITLE,
        SemanticError::Http {
            status: 503,
            message: "overloaded".to_owned(),
        },
    );
    *context.backend.borrow_mut() = Some(Box::new(stub));
}

#[given("a semantic backend that never answers")]
fn silent_backend(context: &EngineContext) {
    *context.backend.borrow_mut() = Some(Box::new(SilentSemantic));
}

#[when("I find matches without semantic augmentation")]
fn find_local(context: &EngineContext) {
    find(context, false);
}

#[when("I find matches with semantic augmentation")]
fn find_augmented(context: &EngineContext) {
    find(context, true);
}

#[then("the found iPhone is returned with a confidence of at least 75")]
fn found_iphone_ranks_highly(context: &EngineContext) {
    let found = ranked(context, FOUND_ID);
    assert!(found.confidence >= 75, "confidence {}", found.confidence);
}

#[then("the match explains its ranking")]
fn found_iphone_reasons(context: &EngineContext) {
    let found = ranked(context, FOUND_ID);
    for expected in [
        "Very close (0.5km)",
        reason::MATCHING_TAGS,
        reason::SAME_DAY,
    ] {
        assert!(
            found.reasons.iter().any(|r| r == expected),
            "missing reason {expected:?} in {:?}",
            found.reasons
        );
    }
}

#[then("no matches are returned")]
fn nothing_returned(context: &EngineContext) {
    assert!(context.results.borrow().is_empty());
}

#[then("both found iPhones are returned")]
fn both_returned(context: &EngineContext) {
    let results = context.results.borrow();
    assert_eq!(results.len(), 2);
    assert!(
        results
            .windows(2)
            .all(|pair| matches!(pair, [a, b] if a.confidence >= b.confidence))
    );
}

#[then("only the healthy match cites AI high confidence")]
fn only_healthy_cites_ai(context: &EngineContext) {
    let healthy = ranked(context, FOUND_ID);
    let broken = ranked(context, BROKEN_ID);
    assert!(healthy.reasons.iter().any(|r| r == reason::AI_HIGH_CONFIDENCE));
    assert!(!broken.reasons.iter().any(|r| r == reason::AI_HIGH_CONFIDENCE));
}

#[then("the found iPhone keeps its local confidence")]
fn keeps_local_confidence(context: &EngineContext) {
    let found = ranked(context, FOUND_ID);
    assert_eq!(found.confidence, 77);
    assert!(!found.reasons.iter().any(|r| r == reason::AI_HIGH_CONFIDENCE));
}

#[scenario(path = "tests/features/match_engine.feature", index = 0)]
fn nearby_phone_ranks_highly(context: EngineContext) {
    let _ = context;
}

#[scenario(path = "tests/features/match_engine.feature", index = 1)]
fn same_disposition_is_excluded(context: EngineContext) {
    let _ = context;
}

#[scenario(path = "tests/features/match_engine.feature", index = 2)]
fn distant_unrelated_report_is_excluded(context: EngineContext) {
    let _ = context;
}

#[scenario(path = "tests/features/match_engine.feature", index = 3)]
fn semantic_failure_is_isolated(context: EngineContext) {
    let _ = context;
}

#[scenario(path = "tests/features/match_engine.feature", index = 4)]
fn silent_backend_is_timed_out(context: EngineContext) {
    let _ = context;
}
