//! Per-item metric derivation.
//!
//! [`compute_metrics`] is a pure function of the item's native counters, its
//! raw insight bag, and the account follower count. Every branch degrades to
//! `None` rather than erroring: missing data is a first-class, queryable
//! state, not an exception.

use crate::picker::{
    pick_metric, REACH_KEYS, SAVE_KEYS, SHARE_KEYS, TOTAL_INTERACTION_KEYS, VIEW_KEYS,
};
use crate::types::{ComputedMetrics, MediaItem, RawInsightsBag};

/// Metrics every item is expected to report, in the order they appear in
/// `missing_metrics`. `views` is expected for every media kind, including
/// static images where the API is known not to report it — surfacing the
/// gap is preferred over hiding it per kind.
const EXPECTED_METRICS: &[&str] = &["saves", "shares", "reach", "views"];

/// Derives [`ComputedMetrics`] from native counters, a raw insight bag, and
/// the follower count.
///
/// `followers` is only used when it is a finite number greater than zero;
/// anything else disables the follower-denominated rates. Rate metrics are
/// `None` whenever their denominator is unavailable or zero — unavailable
/// values are never coerced to zero before the check.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn compute_metrics(
    likes: i64,
    comments: i64,
    bag: &RawInsightsBag,
    followers: Option<f64>,
) -> ComputedMetrics {
    let saves = pick_metric(bag, SAVE_KEYS);
    let reach = pick_metric(bag, REACH_KEYS);
    let views = pick_metric(bag, VIEW_KEYS);
    let shares = pick_metric(bag, SHARE_KEYS);
    let total_interactions = pick_metric(bag, TOTAL_INTERACTION_KEYS);

    let saves_part = saves.value.map_or(0, |v| v as i64);
    let shares_part = shares.value.map_or(0, |v| v as i64);

    let engagement = likes + comments + saves_part + shares_part;
    let score = likes + comments * 2 + saves_part * 3 + shares_part * 4;

    let followers = followers.filter(|f| f.is_finite() && *f > 0.0);

    let er = followers.map(|f| (engagement as f64 / f) * 100.0);
    let reach_rate = match (followers, reach.value) {
        (Some(f), Some(r)) => Some((r / f) * 100.0),
        _ => None,
    };
    let views_rate = match (reach.value, views.value) {
        (Some(r), Some(v)) if r > 0.0 => Some((v / r) * 100.0),
        _ => None,
    };
    let interactions_per_1000_reach = match reach.value {
        Some(r) if r > 0.0 => Some((engagement as f64 / r) * 1000.0),
        _ => None,
    };

    let missing_metrics: Vec<String> = EXPECTED_METRICS
        .iter()
        .filter(|metric| match **metric {
            "saves" => saves.value.is_none(),
            "shares" => shares.value.is_none(),
            "reach" => reach.value.is_none(),
            "views" => views.value.is_none(),
            _ => unreachable!(),
        })
        .map(|m| (*m).to_string())
        .collect();

    let is_partial = !missing_metrics.is_empty();

    ComputedMetrics {
        likes,
        comments,
        saves: saves.value,
        shares: shares.value,
        reach: reach.value,
        views: views.value,
        views_source: views.source,
        total_interactions: total_interactions.value,
        engagement,
        score,
        er,
        reach_rate,
        views_rate,
        interactions_per_1000_reach,
        has_insights: !bag.is_empty(),
        is_partial,
        missing_metrics,
    }
}

/// Merges the resolved canonical keys back over the original bag.
///
/// The result is stable under re-normalization: feeding the merged bag back
/// through [`compute_metrics`] resolves every metric to the same value.
#[must_use]
pub fn merged_bag(bag: &RawInsightsBag, computed: &ComputedMetrics) -> RawInsightsBag {
    let mut merged = bag.clone();
    if let Some(reach) = computed.reach {
        merged.insert("reach".to_string(), reach);
    }
    if let Some(saves) = computed.saves {
        merged.insert("saved".to_string(), saves);
        merged.insert("saves".to_string(), saves);
    }
    if let Some(views) = computed.views {
        merged.insert("views".to_string(), views);
    }
    if let Some(shares) = computed.shares {
        merged.insert("shares".to_string(), shares);
    }
    if let Some(total) = computed.total_interactions {
        merged.insert("total_interactions".to_string(), total);
    }
    merged
}

/// Normalizes one media item in place: computes its metrics and replaces its
/// insight bag with the merged canonical bag.
///
/// This is the only mutation a [`MediaItem`] sees after creation; every
/// downstream layer treats items as read-only.
pub fn normalize_media(item: &mut MediaItem, bag: &RawInsightsBag, followers: Option<f64>) {
    let computed = compute_metrics(item.like_count, item.comments_count, bag, followers);
    item.insights = merged_bag(bag, &computed);
    item.computed = Some(computed);
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
