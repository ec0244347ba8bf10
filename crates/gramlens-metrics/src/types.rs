//! Domain types for normalized Instagram media and derived metrics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw insight values for one media item, keyed by metric name.
///
/// Keys vary by media type and by which candidate metric-set the fetcher
/// landed on. A `BTreeMap` keeps iteration order deterministic so merged
/// bags and aggregates never depend on hash ordering.
pub type RawInsightsBag = BTreeMap<String, f64>;

/// Media classification used for insight candidate selection and filtering.
///
/// Reels are detected via `media_product_type`, not `media_type` — the Graph
/// API reports reels as `media_type: "VIDEO"` with `media_product_type:
/// "REELS"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    Image,
    Video,
    CarouselAlbum,
    Reel,
}

impl MediaKind {
    /// Classifies a media item from its raw `media_type` and
    /// `media_product_type` fields.
    #[must_use]
    pub fn classify(media_type: &str, media_product_type: Option<&str>) -> Self {
        if media_product_type == Some("REELS") {
            return MediaKind::Reel;
        }
        match media_type {
            "CAROUSEL_ALBUM" => MediaKind::CarouselAlbum,
            "REELS" | "REEL" => MediaKind::Reel,
            "VIDEO" => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::CarouselAlbum => write!(f, "carousel"),
            MediaKind::Reel => write!(f, "reel"),
        }
    }
}

/// One post, reel, or carousel with its normalized insights and derived
/// metrics.
///
/// Created from a raw Graph API media record, enriched in place by the
/// normalizer, and read-only for the filtering/sorting/aggregation layers
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
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
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comments_count: i64,
    /// Merged insight bag: the raw fetch result plus resolved canonical keys.
    #[serde(default)]
    pub insights: RawInsightsBag,
    /// Derived metrics; `None` until the item has been normalized.
    #[serde(default)]
    pub computed: Option<ComputedMetrics>,
}

impl MediaItem {
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        MediaKind::classify(&self.media_type, self.media_product_type.as_deref())
    }
}

/// Canonical derived metrics for one media item.
///
/// `None` means "not available from the API", which is distinct from an
/// available value of zero throughout this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedMetrics {
    pub likes: i64,
    pub comments: i64,
    pub saves: Option<f64>,
    pub shares: Option<f64>,
    pub reach: Option<f64>,
    pub views: Option<f64>,
    /// Which raw key supplied `views`, for diagnostics.
    pub views_source: Option<String>,
    pub total_interactions: Option<f64>,
    /// likes + comments + saves + shares, with unavailable components
    /// contributing 0. Always computable.
    pub engagement: i64,
    /// Weighted engagement used for ranking: likes×1 + comments×2 +
    /// saves×3 + shares×4. The weights are a fixed ranking policy.
    pub score: i64,
    /// Engagement rate: engagement / followers × 100.
    pub er: Option<f64>,
    pub reach_rate: Option<f64>,
    pub views_rate: Option<f64>,
    pub interactions_per_1000_reach: Option<f64>,
    /// True iff the raw insight bag was non-empty.
    pub has_insights: bool,
    /// True iff any expected metric came back unavailable.
    pub is_partial: bool,
    /// Expected metrics that came back unavailable, in fixed order.
    pub missing_metrics: Vec<String>,
}

/// One story frame. Stories expire upstream after 24h, so these are
/// ephemeral inputs to [`StoriesAggregate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: String,
    pub media_type: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub insights: RawInsightsBag,
}

/// Rollup over the current story collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoriesAggregate {
    pub total_stories: usize,
    pub total_views: f64,
    pub total_reach: f64,
    pub total_replies: f64,
    pub total_exits: f64,
    pub total_taps_forward: f64,
    pub total_taps_back: f64,
    /// Percentage of story views that did not exit, rounded. Zero when no
    /// views were recorded — the one place where zero is the documented
    /// fallback rather than `None`, since this value is presentation-only.
    pub avg_completion_rate: i64,
}
