//! Metric normalization and aggregation for Instagram Business media.
//!
//! This crate is the pure computational core of gramlens: it turns raw
//! insight bags and native counters into canonical [`ComputedMetrics`],
//! rolls collections up into totals/averages, and filters/sorts normalized
//! items. No I/O happens here; every function is deterministic for equal
//! inputs.

pub mod aggregate;
pub mod filter;
pub mod normalize;
pub mod picker;
pub mod types;

pub use aggregate::{aggregate, aggregate_stories, MediaAggregate, MediaAverages, MediaTotals};
pub use filter::{MediaFilter, SortKey};
pub use normalize::{compute_metrics, normalize_media};
pub use picker::{pick_metric, Picked};
pub use types::{
    ComputedMetrics, MediaItem, MediaKind, RawInsightsBag, StoriesAggregate, StoryItem,
};
