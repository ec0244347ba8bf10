//! First-present-wins resolution of metric synonyms.
//!
//! The Graph API has renamed metrics across versions (`saved` → `saves`,
//! `impressions` → `views`), and which spelling appears depends on the API
//! version and media type. Synonym lists are kept as data here so adding a
//! new spelling is a one-line change rather than another conditional.

use crate::types::RawInsightsBag;

/// Synonym keys for saves, most current spelling last.
pub const SAVE_KEYS: &[&str] = &["saved", "saves"];

/// Keys for media views. Deliberately excludes the deprecated
/// `impressions`: a bag that only carries impressions reports views as
/// unavailable rather than passing off the older metric.
pub const VIEW_KEYS: &[&str] = &["views"];

pub const REACH_KEYS: &[&str] = &["reach"];

pub const SHARE_KEYS: &[&str] = &["shares"];

/// Older API versions reported `engagement` where newer ones report
/// `total_interactions`.
pub const TOTAL_INTERACTION_KEYS: &[&str] = &["total_interactions", "engagement"];

/// Story view synonyms: `impressions` on older API versions.
pub const STORY_VIEW_KEYS: &[&str] = &["views", "impressions"];

/// A resolved metric value and the raw key that supplied it.
///
/// `value` is `None` when no synonym matched — never a guessed zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Picked {
    pub value: Option<f64>,
    pub source: Option<String>,
}

/// Resolves the first key of `keys` present in `bag` with a finite value.
///
/// Non-finite entries (NaN, infinities) are skipped as if absent. Returns a
/// default [`Picked`] (both fields `None`) when nothing matches.
#[must_use]
pub fn pick_metric(bag: &RawInsightsBag, keys: &[&str]) -> Picked {
    for key in keys {
        if let Some(value) = bag.get(*key).copied() {
            if value.is_finite() {
                return Picked {
                    value: Some(value),
                    source: Some((*key).to_string()),
                };
            }
        }
    }
    Picked::default()
}
