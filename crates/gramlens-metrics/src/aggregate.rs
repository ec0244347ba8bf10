//! Collection rollups over normalized media and stories.
//!
//! Two rules that must never be conflated: an unavailable metric contributes
//! 0 to a *sum*, but is *excluded* from an average. An average over an empty
//! subset is `None`, never 0 and never NaN.

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::picker::{pick_metric, STORY_VIEW_KEYS};
use crate::types::{MediaItem, MediaKind, StoriesAggregate, StoryItem};

/// Sums across a media collection. Unavailable values contribute 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaTotals {
    pub likes: i64,
    pub comments: i64,
    pub saves: f64,
    pub shares: f64,
    pub reach: f64,
    pub views: f64,
    pub engagement: i64,
    pub score: i64,
}

/// Averages across a media collection, each computed only over the items
/// where the metric is available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaAverages {
    pub er: Option<f64>,
    pub reach_rate: Option<f64>,
    pub interactions_per_1000_reach: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaAggregate {
    /// Items that carried computed metrics and entered the rollup.
    pub count: usize,
    pub totals: MediaTotals,
    pub averages: MediaAverages,
}

/// Accumulates a mean over only the available values of a metric.
#[derive(Default)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Rolls up an arbitrary subset of normalized items.
///
/// Items that have not been normalized (no `computed`) are skipped entirely
/// rather than contributing partial native counters.
pub fn aggregate<'a, I>(items: I) -> MediaAggregate
where
    I: IntoIterator<Item = &'a MediaItem>,
{
    let mut agg = MediaAggregate::default();
    let mut er = MeanAcc::default();
    let mut reach_rate = MeanAcc::default();
    let mut per_1000 = MeanAcc::default();

    for item in items {
        let Some(m) = item.computed.as_ref() else {
            continue;
        };
        agg.count += 1;
        agg.totals.likes += m.likes;
        agg.totals.comments += m.comments;
        agg.totals.saves += m.saves.unwrap_or(0.0);
        agg.totals.shares += m.shares.unwrap_or(0.0);
        agg.totals.reach += m.reach.unwrap_or(0.0);
        agg.totals.views += m.views.unwrap_or(0.0);
        agg.totals.engagement += m.engagement;
        agg.totals.score += m.score;

        er.push(m.er);
        reach_rate.push(m.reach_rate);
        per_1000.push(m.interactions_per_1000_reach);
    }

    agg.averages.er = er.mean();
    agg.averages.reach_rate = reach_rate.mean();
    agg.averages.interactions_per_1000_reach = per_1000.mean();
    agg
}

fn bucketed<'a, K, F>(items: &'a [MediaItem], key_of: F) -> Vec<(K, MediaAggregate)>
where
    K: Ord,
    F: Fn(&'a MediaItem) -> Option<K>,
{
    let mut buckets: BTreeMap<K, Vec<&MediaItem>> = BTreeMap::new();
    for item in items {
        if let Some(key) = key_of(item) {
            buckets.entry(key).or_default().push(item);
        }
    }
    buckets
        .into_iter()
        .map(|(key, members)| (key, aggregate(members.iter().copied())))
        .collect()
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Rollup per posting weekday, Monday first. Items without a timestamp are
/// omitted; a weekday with no items does not appear.
#[must_use]
pub fn aggregate_by_weekday(items: &[MediaItem]) -> Vec<(String, MediaAggregate)> {
    bucketed(items, |item| {
        item.timestamp.map(|ts| ts.weekday().num_days_from_monday())
    })
    .into_iter()
    .map(|(day, agg)| {
        let weekday = match day {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        };
        (weekday_label(weekday).to_string(), agg)
    })
    .collect()
}

/// Rollup per posting hour (UTC, 0–23). Empty hours are omitted.
#[must_use]
pub fn aggregate_by_hour(items: &[MediaItem]) -> Vec<(u32, MediaAggregate)> {
    bucketed(items, |item| item.timestamp.map(|ts| ts.hour()))
}

/// Rollup per media kind, in enum order. Kinds with no items are omitted.
#[must_use]
pub fn aggregate_by_kind(items: &[MediaItem]) -> Vec<(MediaKind, MediaAggregate)> {
    bucketed(items, |item| Some(item.kind()))
}

/// Rollup per ISO week, labeled `"2025-W31"`. Labels sort chronologically.
#[must_use]
pub fn aggregate_by_week(items: &[MediaItem]) -> Vec<(String, MediaAggregate)> {
    bucketed(items, |item| {
        item.timestamp.map(|ts| {
            let week = ts.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        })
    })
}

/// Rolls up the current story collection.
///
/// Story bags use the story metric names (`replies`, `exits`,
/// `taps_forward`, `taps_back`) with `views` falling back to the deprecated
/// `impressions` spelling. Unavailable values contribute 0 to every sum.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn aggregate_stories(stories: &[StoryItem]) -> StoriesAggregate {
    let mut agg = StoriesAggregate {
        total_stories: stories.len(),
        ..StoriesAggregate::default()
    };

    for story in stories {
        let views = pick_metric(&story.insights, STORY_VIEW_KEYS);
        agg.total_views += views.value.unwrap_or(0.0);
        agg.total_reach += story.insights.get("reach").copied().unwrap_or(0.0);
        agg.total_replies += story.insights.get("replies").copied().unwrap_or(0.0);
        agg.total_exits += story.insights.get("exits").copied().unwrap_or(0.0);
        agg.total_taps_forward += story.insights.get("taps_forward").copied().unwrap_or(0.0);
        agg.total_taps_back += story.insights.get("taps_back").copied().unwrap_or(0.0);
    }

    if agg.total_views > 0.0 {
        agg.avg_completion_rate =
            ((1.0 - agg.total_exits / agg.total_views) * 100.0).round() as i64;
    }
    agg
}
