//! Filtering and ranking of normalized media items.

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{MediaItem, MediaKind};

/// Predicate over normalized media items. All criteria are conjunctive;
/// a default filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    /// Inclusive lower bound on the posting timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the posting timestamp.
    pub until: Option<DateTime<Utc>>,
    pub weekday: Option<Weekday>,
    pub kind: Option<MediaKind>,
    /// Case-insensitive substring over caption and id.
    pub search: Option<String>,
    /// Week-of-month bucket: `ceil(day_of_month / 7)`, so 1–5.
    pub week_of_month: Option<u32>,
}

impl MediaFilter {
    /// Returns true when `item` passes every active criterion.
    ///
    /// An item with no timestamp is excluded whenever any time-based
    /// criterion (range, weekday, week-of-month) is active.
    #[must_use]
    pub fn matches(&self, item: &MediaItem) -> bool {
        let needs_timestamp = self.since.is_some()
            || self.until.is_some()
            || self.weekday.is_some()
            || self.week_of_month.is_some();

        if needs_timestamp {
            let Some(ts) = item.timestamp else {
                return false;
            };
            if self.since.is_some_and(|since| ts < since) {
                return false;
            }
            if self.until.is_some_and(|until| ts > until) {
                return false;
            }
            if self.weekday.is_some_and(|day| ts.weekday() != day) {
                return false;
            }
            if self
                .week_of_month
                .is_some_and(|week| week_of_month(ts) != week)
            {
                return false;
            }
        }

        if self.kind.is_some_and(|kind| item.kind() != kind) {
            return false;
        }

        if let Some(needle) = self.search.as_deref() {
            let needle = needle.to_lowercase();
            let caption_hit = item
                .caption
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle));
            if !caption_hit && !item.id.to_lowercase().contains(&needle) {
                return false;
            }
        }

        true
    }

    /// Applies the filter, preserving input order.
    #[must_use]
    pub fn apply<'a>(&self, items: &'a [MediaItem]) -> Vec<&'a MediaItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// `ceil(day_of_month / 7)`: days 1–7 are week 1, 8–14 week 2, and so on.
#[must_use]
pub fn week_of_month(ts: DateTime<Utc>) -> u32 {
    ts.day().div_ceil(7)
}

/// Derived metric a media list can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Likes,
    Comments,
    Saves,
    Shares,
    Reach,
    Views,
    Engagement,
    Score,
    Er,
    ReachRate,
    ViewsRate,
    InteractionsPer1000Reach,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "likes" => Ok(SortKey::Likes),
            "comments" => Ok(SortKey::Comments),
            "saves" => Ok(SortKey::Saves),
            "shares" => Ok(SortKey::Shares),
            "reach" => Ok(SortKey::Reach),
            "views" => Ok(SortKey::Views),
            "engagement" => Ok(SortKey::Engagement),
            "score" => Ok(SortKey::Score),
            "er" => Ok(SortKey::Er),
            "reach_rate" => Ok(SortKey::ReachRate),
            "views_rate" => Ok(SortKey::ViewsRate),
            "interactions_per_1000_reach" => Ok(SortKey::InteractionsPer1000Reach),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

impl SortKey {
    /// Reads the keyed value off an item's computed metrics.
    ///
    /// `None` for unavailable metrics and for items that were never
    /// normalized; those sort after every available value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value_of(self, item: &MediaItem) -> Option<f64> {
        let m = item.computed.as_ref()?;
        match self {
            SortKey::Likes => Some(m.likes as f64),
            SortKey::Comments => Some(m.comments as f64),
            SortKey::Saves => m.saves,
            SortKey::Shares => m.shares,
            SortKey::Reach => m.reach,
            SortKey::Views => m.views,
            SortKey::Engagement => Some(m.engagement as f64),
            SortKey::Score => Some(m.score as f64),
            SortKey::Er => m.er,
            SortKey::ReachRate => m.reach_rate,
            SortKey::ViewsRate => m.views_rate,
            SortKey::InteractionsPer1000Reach => m.interactions_per_1000_reach,
        }
    }
}

/// Sorts items by the keyed metric, descending, with ties (and unavailable
/// values) keeping their input order. `Vec::sort_by` is stable, which the
/// tie-break rule depends on.
pub fn sort_by_metric(items: &mut [&MediaItem], key: SortKey) {
    items.sort_by(|a, b| compare_desc(key.value_of(a), key.value_of(b)));
}

fn compare_desc(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
