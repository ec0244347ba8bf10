//! Bounded-concurrency insight enrichment across a media collection.
//!
//! Fetches fan out within a batch and batches run sequentially, keeping
//! upstream call volume under the rate limits. Each item's fetch is
//! isolated: a failure degrades that one item to an empty bag and never
//! fails the batch.

use futures::stream::{self, StreamExt};

use gramlens_metrics::{normalize_media, MediaItem, MediaKind, RawInsightsBag, StoryItem};

use crate::client::GraphClient;
use crate::insights::{fetch_media_insights, fetch_story_insights};

/// Outcome of an enrichment pass, used to surface dashboard messages.
#[derive(Debug, Clone, Default)]
pub struct EnrichSummary {
    /// Items that went through an insight fetch.
    pub fetched: usize,
    /// Set when a media limit cut the fetch short of the full collection.
    pub truncated: Option<usize>,
    /// Fetched items whose computed metrics flag missing data.
    pub partial: usize,
}

/// Enriches and normalizes every item in place.
///
/// The first `media_limit` items (the most recent, as the API returns them)
/// get insight fetches, batched `batch_size` at a time; `media_limit == 0`
/// removes the cap. Items past the limit are still normalized — against an
/// empty bag — so every item carries computed metrics afterwards.
pub async fn enrich_media(
    client: &GraphClient,
    items: &mut [MediaItem],
    followers: Option<f64>,
    batch_size: usize,
    media_limit: usize,
) -> EnrichSummary {
    let scope = if media_limit > 0 {
        media_limit.min(items.len())
    } else {
        items.len()
    };
    let batch_size = batch_size.max(1);

    let meta: Vec<(usize, String, MediaKind)> = items[..scope]
        .iter()
        .enumerate()
        .map(|(idx, item)| (idx, item.id.clone(), item.kind()))
        .collect();

    for batch in meta.chunks(batch_size) {
        let bags: Vec<(usize, RawInsightsBag)> = stream::iter(batch.to_vec())
            .map(|(idx, id, kind)| async move {
                (idx, fetch_media_insights(client, &id, kind).await)
            })
            .buffer_unordered(batch.len())
            .collect()
            .await;

        for (idx, bag) in bags {
            normalize_media(&mut items[idx], &bag, followers);
        }
    }

    for item in &mut items[scope..] {
        normalize_media(item, &RawInsightsBag::new(), followers);
    }

    let partial = items[..scope]
        .iter()
        .filter(|item| item.computed.as_ref().is_some_and(|m| m.is_partial))
        .count();

    EnrichSummary {
        fetched: scope,
        truncated: (scope < items.len()).then_some(scope),
        partial,
    }
}

/// Fetches insight bags for every story frame, batched like media.
pub async fn enrich_stories(client: &GraphClient, stories: &mut [StoryItem], batch_size: usize) {
    let batch_size = batch_size.max(1);
    let ids: Vec<(usize, String)> = stories
        .iter()
        .enumerate()
        .map(|(idx, story)| (idx, story.id.clone()))
        .collect();

    for batch in ids.chunks(batch_size) {
        let bags: Vec<(usize, RawInsightsBag)> = stream::iter(batch.to_vec())
            .map(|(idx, id)| async move { (idx, fetch_story_insights(client, &id).await) })
            .buffer_unordered(batch.len())
            .collect()
            .await;

        for (idx, bag) in bags {
            stories[idx].insights = bag;
        }
    }
}
