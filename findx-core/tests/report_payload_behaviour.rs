#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for decoding host report payloads.

use std::cell::RefCell;

use findx_core::{Category, Disposition, Report};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Shared state for one scenario run.
pub struct PayloadContext {
    payload: RefCell<String>,
    decoded: RefCell<Option<Result<Report, String>>>,
}

#[fixture]
/// Build a fresh `PayloadContext` for each scenario run.
pub fn context() -> PayloadContext {
    PayloadContext {
        payload: RefCell::new(String::new()),
        decoded: RefCell::new(None),
    }
}

#[given("a host payload for a found pet with a location")]
fn found_pet_payload(context: &PayloadContext) {
    *context.payload.borrow_mut() = r#"{
        "id": "pet-1",
        "type": "found",
        "category": "pet",
        "title": "Found beagle near park",
        "aiTags": ["beagle", "dog", "brown collar"],
        "location": { "lat": 12.9716, "lng": 77.5946 },
        "reportedAt": "2024-05-01T09:30:00+05:30"
    }"#
    .to_owned();
}

#[given("a host payload for a lost item without a location")]
fn lost_item_payload(context: &PayloadContext) {
    *context.payload.borrow_mut() = r#"{
        "id": "item-1",
        "disposition": "lost",
        "category": "item",
        "status": "active",
        "title": "Black wallet",
        "description": "Leather, two cards inside",
        "tags": [],
        "reportedAt": "2024-05-01T10:00:00Z"
    }"#
    .to_owned();
}

#[given("a host payload with an unknown category")]
fn unknown_category_payload(context: &PayloadContext) {
    *context.payload.borrow_mut() = r#"{
        "id": "x",
        "disposition": "lost",
        "category": "vehicle",
        "reportedAt": "2024-05-01T10:00:00Z"
    }"#
    .to_owned();
}

#[when("I decode the payload")]
fn decode(context: &PayloadContext) {
    let payload = context.payload.borrow();
    let decoded = serde_json::from_str::<Report>(&payload).map_err(|err| err.to_string());
    *context.decoded.borrow_mut() = Some(decoded);
}

fn decoded_report(context: &PayloadContext) -> Report {
    context
        .decoded
        .borrow()
        .clone()
        .expect("payload should be decoded")
        .expect("payload should be valid")
}

#[then("the report is a found pet")]
fn is_found_pet(context: &PayloadContext) {
    let report = decoded_report(context);
    assert_eq!(report.disposition, Disposition::Found);
    assert_eq!(report.category, Category::Pet);
    assert!(report.is_active());
}

#[then("the report is a lost item")]
fn is_lost_item(context: &PayloadContext) {
    let report = decoded_report(context);
    assert_eq!(report.disposition, Disposition::Lost);
    assert_eq!(report.category, Category::Item);
}

#[then("the report has a usable location")]
fn has_location(context: &PayloadContext) {
    assert!(decoded_report(context).valid_location().is_some());
}

#[then("the report has no usable location")]
fn has_no_location(context: &PayloadContext) {
    assert!(decoded_report(context).valid_location().is_none());
}

#[then("decoding fails")]
fn decoding_fails(context: &PayloadContext) {
    let decoded = context.decoded.borrow();
    assert!(matches!(decoded.as_ref(), Some(Err(_))));
}

#[scenario(path = "tests/features/report_payload.feature", index = 0)]
fn found_pet_with_location(context: PayloadContext) {
    let _ = context;
}

#[scenario(path = "tests/features/report_payload.feature", index = 1)]
fn lost_item_without_location(context: PayloadContext) {
    let _ = context;
}

#[scenario(path = "tests/features/report_payload.feature", index = 2)]
fn unknown_category_is_rejected(context: PayloadContext) {
    let _ = context;
}
