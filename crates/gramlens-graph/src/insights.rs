//! Per-media-type insight fetching with candidate fallback.
//!
//! The Graph API rejects certain metric combinations for certain media
//! types, and the supported set shifts across API versions without
//! documentation. Each media kind therefore carries an ordered list of
//! metric-set candidates, most-complete first; candidates are tried
//! sequentially and the first one that yields data wins. Exhausting every
//! candidate produces an empty bag — a normal outcome for brand-new posts
//! or restricted permissions, not an error.

use std::collections::BTreeMap;

use gramlens_metrics::{MediaKind, RawInsightsBag};

use crate::client::GraphClient;
use crate::types::InsightsResponse;

const CAROUSEL_CANDIDATES: &[&str] = &[
    "views,reach,saved,shares,total_interactions",
    "reach,saved,total_interactions",
    "reach,saved",
    "reach",
];

const REEL_CANDIDATES: &[&str] = &[
    "views,reach,saved,shares,total_interactions",
    "views,reach,saved,shares",
    "reach,saved",
    "reach",
];

const VIDEO_CANDIDATES: &[&str] = &[
    "views,reach,saved,shares,total_interactions",
    "views,reach,saved",
    "reach,saved",
    "reach",
];

/// Image fallbacks include the deprecated `impressions` spelling, which
/// some API versions still accept for static posts after rejecting `views`.
const IMAGE_CANDIDATES: &[&str] = &[
    "views,reach,saved,shares,total_interactions",
    "views,reach,saved",
    "impressions,reach,saved",
    "reach,saved",
    "reach",
];

/// Candidate metric sets for story frames.
pub const STORY_CANDIDATES: &[&str] = &[
    "views,reach,replies,exits,taps_forward,taps_back",
    "impressions,reach,replies,exits,taps_forward,taps_back",
    "impressions,reach,replies",
];

/// The ordered candidate metric sets for a media kind.
#[must_use]
pub fn insight_candidates(kind: MediaKind) -> &'static [&'static str] {
    match kind {
        MediaKind::CarouselAlbum => CAROUSEL_CANDIDATES,
        MediaKind::Reel => REEL_CANDIDATES,
        MediaKind::Video => VIDEO_CANDIDATES,
        MediaKind::Image => IMAGE_CANDIDATES,
    }
}

/// Flattens an insights response into a metric-name → value bag.
///
/// Takes the **last** element of each metric's `values` array, so
/// period-aggregated responses resolve to the most recent total.
/// Non-numeric values (breakdown objects) are ignored.
#[must_use]
pub fn parse_insight_bag(response: &InsightsResponse) -> RawInsightsBag {
    let mut bag = RawInsightsBag::new();
    for entry in &response.data {
        let Some(last) = entry.values.last() else {
            continue;
        };
        if let Some(value) = last.value.as_f64() {
            bag.insert(entry.name.clone(), value);
        }
    }
    bag
}

/// Extracts an hour → count map from a metric whose values are objects
/// (`online_followers`). Takes the last sample, like [`parse_insight_bag`].
#[must_use]
pub fn parse_hour_map(response: &InsightsResponse) -> BTreeMap<String, f64> {
    let mut map = BTreeMap::new();
    for entry in &response.data {
        let Some(last) = entry.values.last() else {
            continue;
        };
        let Some(object) = last.value.as_object() else {
            continue;
        };
        for (hour, count) in object {
            if let Some(count) = count.as_f64() {
                map.insert(hour.clone(), count);
            }
        }
    }
    map
}

/// Fetches the richest available insight bag for one media item.
///
/// Never fails: every candidate error degrades to "try the next one", and
/// exhaustion returns an empty bag.
pub async fn fetch_media_insights(
    client: &GraphClient,
    media_id: &str,
    kind: MediaKind,
) -> RawInsightsBag {
    fetch_with_candidates(client, media_id, insight_candidates(kind)).await
}

/// Story-frame variant of [`fetch_media_insights`].
pub async fn fetch_story_insights(client: &GraphClient, story_id: &str) -> RawInsightsBag {
    fetch_with_candidates(client, story_id, STORY_CANDIDATES).await
}

async fn fetch_with_candidates(
    client: &GraphClient,
    media_id: &str,
    candidates: &[&str],
) -> RawInsightsBag {
    for metrics in candidates {
        match client.get_media_insights(media_id, metrics).await {
            Ok(bag) if !bag.is_empty() => {
                tracing::debug!(media_id, metrics, keys = bag.len(), "insight candidate accepted");
                return bag;
            }
            Ok(_) => {
                tracing::debug!(media_id, metrics, "insight candidate returned no data");
            }
            Err(err) => {
                tracing::debug!(
                    media_id,
                    metrics,
                    error = %err,
                    "insight candidate rejected — trying next"
                );
            }
        }
    }
    tracing::debug!(media_id, "all insight candidates exhausted; treating insights as absent");
    RawInsightsBag::new()
}
