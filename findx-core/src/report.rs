//! Lost and found reports as seen by the match engine.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, matching
//! the rest of the `geo` ecosystem. When serialised they use the host's
//! `{ "lat": .., "lng": .. }` shape.

use std::fmt;
use std::str::FromStr;

use geo::Coord;
use thiserror::Error;
use time::OffsetDateTime;

/// Whether a report concerns something lost or something found.
///
/// # Examples
/// ```
/// use findx_core::Disposition;
///
/// assert_eq!(Disposition::Lost.opposite(), Disposition::Found);
/// assert_eq!(Disposition::Found.to_string(), "found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Disposition {
    /// The reporter lost the subject.
    Lost,
    /// The reporter found the subject.
    Found,
}

impl Disposition {
    /// Return the disposition a matching report must carry.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Lost => Self::Found,
            Self::Found => Self::Lost,
        }
    }

    /// Return the disposition as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lost => "lost",
            Self::Found => "found",
        }
    }
}

/// The kind of subject a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Category {
    /// Belongings such as phones, wallets, or keys.
    Item,
    /// Animals.
    Pet,
    /// Missing or found people.
    Person,
}

impl Category {
    /// Return the category as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Pet => "pet",
            Self::Person => "person",
        }
    }
}

/// Lifecycle state of a report. Only [`ReportStatus::Active`] reports take
/// part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ReportStatus {
    /// Open and looking for a counterpart.
    #[default]
    Active,
    /// Paired with a counterpart, awaiting confirmation.
    Matched,
    /// The subject was returned.
    Recovered,
    /// Withdrawn by the reporter or a moderator.
    Closed,
}

impl ReportStatus {
    /// Return the status as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Matched => "matched",
            Self::Recovered => "recovered",
            Self::Closed => "closed",
        }
    }
}

/// Error returned when parsing one of the report enums from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

impl FromStr for Disposition {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lost" => Ok(Self::Lost),
            "found" => Ok(Self::Found),
            _ => Err(ParseEnumError::new("disposition", s)),
        }
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "item" => Ok(Self::Item),
            "pet" => Ok(Self::Pet),
            "person" => Ok(Self::Person),
            _ => Err(ParseEnumError::new("category", s)),
        }
    }
}

impl FromStr for ReportStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "matched" => Ok(Self::Matched),
            "recovered" => Ok(Self::Recovered),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of a lost or found report.
///
/// The engine never mutates reports; hosts own their lifecycle.
///
/// # Examples
/// ```
/// use findx_core::{Category, Disposition, Report};
/// use time::macros::datetime;
///
/// let report = Report::new("r-1", Disposition::Lost, Category::Pet, datetime!(2024-05-01 10:00 UTC))
///     .with_title("Lost beagle")
///     .with_tags(["beagle", "dog"])
///     .with_location(12.97, 77.59);
///
/// assert!(report.is_active());
/// assert_eq!(report.tags.len(), 2);
/// assert_eq!(report.valid_location().map(|c| c.y), Some(12.97));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Report {
    /// Host-assigned identifier.
    pub id: String,
    /// Lost or found.
    #[cfg_attr(feature = "serde", serde(alias = "type"))]
    pub disposition: Disposition,
    /// Kind of subject.
    pub category: Category,
    /// Lifecycle state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: ReportStatus,
    /// Short headline.
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    /// Free-text description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Normalised keywords, usually generated from photos or descriptions.
    #[cfg_attr(feature = "serde", serde(default, alias = "aiTags"))]
    pub tags: Vec<String>,
    /// Where the subject was lost or found, when the reporter shared it.
    #[cfg_attr(feature = "serde", serde(default, with = "lat_lng"))]
    pub location: Option<Coord<f64>>,
    /// When the report was filed.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub reported_at: OffsetDateTime,
}

impl Report {
    /// Construct an active report with empty text, no tags, and no location.
    pub fn new(
        id: impl Into<String>,
        disposition: Disposition,
        category: Category,
        reported_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            disposition,
            category,
            status: ReportStatus::Active,
            title: String::new(),
            description: String::new(),
            tags: Vec::new(),
            location: None,
            reported_at,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the tag list.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the location from latitude and longitude in degrees.
    #[must_use]
    pub const fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(Coord { x: lng, y: lat });
        self
    }

    /// Set the lifecycle status.
    #[must_use]
    pub const fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = status;
        self
    }

    /// Report whether the report can take part in matching.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ReportStatus::Active
    }

    /// Return the location when it is a usable WGS84 coordinate.
    ///
    /// Non-finite or out-of-range coordinates are treated as withheld so
    /// that a malformed location never produces a distance.
    #[must_use]
    pub fn valid_location(&self) -> Option<Coord<f64>> {
        self.location.filter(|c| {
            c.x.is_finite()
                && c.y.is_finite()
                && (-90.0..=90.0).contains(&c.y)
                && (-180.0..=180.0).contains(&c.x)
        })
    }
}

#[cfg(feature = "serde")]
mod lat_lng {
    //! Serialise optional coordinates as `{ "lat": .., "lng": .. }`.

    use geo::Coord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct LatLng {
        lat: f64,
        lng: f64,
    }

    #[expect(
        clippy::ref_option,
        reason = "serde `with` modules receive the field by reference"
    )]
    pub(super) fn serialize<S>(location: &Option<Coord<f64>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        location
            .map(|c| LatLng { lat: c.y, lng: c.x })
            .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Coord<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<LatLng>::deserialize(deserializer)?.map(|p| Coord { x: p.lng, y: p.lat }))
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use time::macros::datetime;

    #[fixture]
    fn report() -> Report {
        Report::new(
            "r-1",
            Disposition::Lost,
            Category::Item,
            datetime!(2024-05-01 10:00 UTC),
        )
    }

    #[rstest]
    fn new_reports_are_active_and_empty(report: Report) {
        assert!(report.is_active());
        assert!(report.tags.is_empty());
        assert!(report.location.is_none());
        assert!(report.title.is_empty());
    }

    #[rstest]
    #[case("lost", Disposition::Lost)]
    #[case(" FOUND ", Disposition::Found)]
    fn disposition_parses_case_insensitively(#[case] input: &str, #[case] expected: Disposition) {
        assert_eq!(input.parse::<Disposition>(), Ok(expected));
    }

    #[rstest]
    fn parsing_rejects_unknown_category() {
        let err = "vehicle".parse::<Category>().expect_err("vehicle is not a category");
        assert_eq!(err.kind, "category");
        assert!(err.to_string().contains("unknown category 'vehicle'"));
    }

    #[rstest]
    #[case(ReportStatus::Active, true)]
    #[case(ReportStatus::Matched, false)]
    #[case(ReportStatus::Recovered, false)]
    #[case(ReportStatus::Closed, false)]
    fn only_active_reports_are_active(
        report: Report,
        #[case] status: ReportStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(report.with_status(status).is_active(), expected);
    }

    #[rstest]
    fn with_location_stores_longitude_as_x(report: Report) {
        let located = report.with_location(12.5, 77.25);
        assert_eq!(located.location, Some(Coord { x: 77.25, y: 12.5 }));
    }

    #[rstest]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    #[case(91.0, 0.0)]
    #[case(0.0, -180.5)]
    fn malformed_locations_are_not_valid(report: Report, #[case] lat: f64, #[case] lng: f64) {
        assert!(report.with_location(lat, lng).valid_location().is_none());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialises_host_shape() {
        let json = r#"{
            "id": "abc",
            "type": "found",
            "category": "pet",
            "status": "active",
            "title": "Found beagle",
            "description": "Brown collar",
            "aiTags": ["beagle", "dog"],
            "location": { "lat": 12.9, "lng": 77.6 },
            "reportedAt": "2024-05-01T10:00:00Z"
        }"#;

        let report: Report = serde_json::from_str(json).expect("host payload should parse");

        assert_eq!(report.disposition, Disposition::Found);
        assert_eq!(report.category, Category::Pet);
        assert_eq!(report.tags, vec!["beagle".to_owned(), "dog".to_owned()]);
        assert_eq!(report.location, Some(Coord { x: 77.6, y: 12.9 }));
        assert_eq!(report.reported_at, datetime!(2024-05-01 10:00 UTC));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn missing_location_deserialises_as_none() {
        let json = r#"{
            "id": "abc",
            "disposition": "lost",
            "category": "item",
            "location": null,
            "reportedAt": "2024-05-01T10:00:00Z"
        }"#;

        let report: Report = serde_json::from_str(json).expect("payload should parse");

        assert!(report.location.is_none());
        assert_eq!(report.status, ReportStatus::Active);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serialises_location_as_lat_lng(report: Report) {
        let value = serde_json::to_value(report.with_location(1.5, 2.5)).expect("serialise");
        assert_eq!(
            value.pointer("/location"),
            Some(&serde_json::json!({ "lat": 1.5, "lng": 2.5 }))
        );
        assert_eq!(value.get("disposition"), Some(&serde_json::json!("lost")));
    }
}
