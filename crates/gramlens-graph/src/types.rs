//! Graph API response types.
//!
//! All types model the JSON structures returned by the Instagram Business
//! Graph API. List endpoints wrap their results in a `{"data": [...],
//! "paging": {...}}` envelope; [`Paged`] captures that pattern generically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gramlens_metrics::MediaItem;

/// Generic list envelope: `{ "data": [...], "paging": {...} }`.
#[derive(Debug, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub cursors: Option<Cursors>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

/// Business account profile fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub followers_count: Option<i64>,
    #[serde(default)]
    pub follows_count: Option<i64>,
    #[serde(default)]
    pub media_count: Option<i64>,
}

/// One raw media record from the media list endpoint.
///
/// `timestamp` stays a string here: the Graph API emits `+0000` offsets,
/// which RFC 3339 deserializers reject. [`parse_graph_timestamp`] handles
/// the conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphMedia {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub media_type: String,
    #[serde(default)]
    pub media_product_type: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub like_count: Option<i64>,
    #[serde(default)]
    pub comments_count: Option<i64>,
}

impl GraphMedia {
    /// Converts the wire record into a domain [`MediaItem`] with an empty
    /// insight bag, ready for enrichment.
    #[must_use]
    pub fn into_media_item(self) -> MediaItem {
        let timestamp = self.timestamp.as_deref().and_then(parse_graph_timestamp);
        MediaItem {
            id: self.id,
            caption: self.caption,
            media_type: self.media_type,
            media_product_type: self.media_product_type,
            media_url: self.media_url,
            thumbnail_url: self.thumbnail_url,
            permalink: self.permalink,
            timestamp,
            like_count: self.like_count.unwrap_or(0),
            comments_count: self.comments_count.unwrap_or(0),
            insights: gramlens_metrics::RawInsightsBag::new(),
            computed: None,
        }
    }
}

/// Parses a Graph API timestamp (`"2025-07-01T12:30:00+0000"`) into UTC.
///
/// Returns `None` if the string matches neither the Graph offset format nor
/// strict RFC 3339.
#[must_use]
pub fn parse_graph_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Response envelope for `/{media-id}/insights`.
#[derive(Debug, Deserialize)]
pub struct InsightsResponse {
    #[serde(default = "Vec::new")]
    pub data: Vec<InsightEntry>,
}

/// One metric series in an insights response.
#[derive(Debug, Deserialize)]
pub struct InsightEntry {
    pub name: String,
    #[serde(default = "Vec::new")]
    pub values: Vec<InsightValue>,
}

/// A single sample. `value` may be a number or, for breakdown-style metrics
/// such as `online_followers`, an object.
#[derive(Debug, Deserialize)]
pub struct InsightValue {
    pub value: serde_json::Value,
}

/// Response shape for `follower_demographics` breakdown queries
/// (`metric_type=total_value`).
#[derive(Debug, Deserialize)]
pub struct DemographicsResponse {
    #[serde(default = "Vec::new")]
    pub data: Vec<DemographicEntry>,
}

#[derive(Debug, Deserialize)]
pub struct DemographicEntry {
    pub name: String,
    #[serde(default)]
    pub total_value: Option<TotalValue>,
}

#[derive(Debug, Deserialize)]
pub struct TotalValue {
    #[serde(default = "Vec::new")]
    pub breakdowns: Vec<BreakdownSeries>,
}

#[derive(Debug, Deserialize)]
pub struct BreakdownSeries {
    #[serde(default = "Vec::new")]
    pub results: Vec<BreakdownResult>,
}

#[derive(Debug, Deserialize)]
pub struct BreakdownResult {
    #[serde(default = "Vec::new")]
    pub dimension_values: Vec<String>,
    pub value: f64,
}
