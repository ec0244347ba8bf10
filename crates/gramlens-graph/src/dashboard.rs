//! Full dashboard assembly.
//!
//! Profile and media-list failures abort the build — downstream aggregation
//! is meaningless without them. Everything else (stories, demographics,
//! online followers) degrades to empty data plus an entry in `messages`, so
//! the dashboard renders with partial data instead of a blank error screen.

use std::collections::BTreeMap;

use serde::Serialize;

use gramlens_core::AppConfig;
use gramlens_metrics::{aggregate_stories, MediaItem, StoriesAggregate, StoryItem};

use crate::client::GraphClient;
use crate::enrich::{enrich_media, enrich_stories};
use crate::error::GraphError;
use crate::types::{parse_graph_timestamp, Profile};

/// Graph error code for insights requests against an audience below the
/// reporting threshold.
const CODE_INSUFFICIENT_AUDIENCE: i64 = 10;

/// Follower demographics broken down by dimension.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Demographics {
    pub age: BTreeMap<String, f64>,
    pub gender: BTreeMap<String, f64>,
    pub country: BTreeMap<String, f64>,
    pub city: BTreeMap<String, f64>,
}

impl Demographics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.age.is_empty()
            && self.gender.is_empty()
            && self.country.is_empty()
            && self.city.is_empty()
    }
}

/// The normalized payload consumed by the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardPayload {
    pub profile: Profile,
    pub media: Vec<MediaItem>,
    pub stories: Vec<StoryItem>,
    pub stories_aggregate: StoriesAggregate,
    pub demographics: Demographics,
    pub online_followers: BTreeMap<String, f64>,
    /// Human-readable caveats about systemic limitations in this payload.
    pub messages: Vec<String>,
}

/// Fetches, enriches, and assembles the full dashboard.
///
/// # Errors
///
/// - [`GraphError::Auth`] if the access token is rejected anywhere a
///   request-level fetch is required.
/// - Any [`GraphError`] from the profile or media-list fetches, and
///   transport-level errors from the demographics fetch. Per-item insight
///   failures never propagate.
#[allow(clippy::cast_precision_loss)]
pub async fn build_dashboard(
    client: &GraphClient,
    config: &AppConfig,
) -> Result<DashboardPayload, GraphError> {
    let mut messages: Vec<String> = Vec::new();

    let profile = client.get_profile(&config.ig_user_id).await?;
    tracing::info!(
        username = profile.username.as_deref().unwrap_or("?"),
        followers = profile.followers_count,
        "fetched profile"
    );

    let raw_media = client
        .get_all_media(
            &config.ig_user_id,
            config.media_page_size,
            config.media_fetch_limit,
        )
        .await?;
    let mut media: Vec<MediaItem> = raw_media
        .into_iter()
        .map(crate::types::GraphMedia::into_media_item)
        .collect();
    tracing::info!(count = media.len(), "fetched media list");

    let followers = profile.followers_count.map(|c| c as f64);
    let summary = enrich_media(
        client,
        &mut media,
        followers,
        config.insights_batch_size,
        config.insights_media_limit,
    )
    .await;

    if let Some(limit) = summary.truncated {
        messages.push(format!("insights limited to {limit} most recent posts"));
    }
    if summary.partial > 0 {
        messages.push(format!(
            "{} of {} posts have incomplete insights",
            summary.partial, summary.fetched
        ));
    }

    let mut stories = match client.get_stories(&config.ig_user_id).await {
        Ok(raw) => raw
            .into_iter()
            .map(|s| StoryItem {
                id: s.id,
                media_type: s.media_type,
                timestamp: s.timestamp.as_deref().and_then(parse_graph_timestamp),
                insights: gramlens_metrics::RawInsightsBag::new(),
            })
            .collect::<Vec<_>>(),
        Err(err) => {
            tracing::warn!(error = %err, "stories unavailable");
            messages.push(format!("stories unavailable: {err}"));
            Vec::new()
        }
    };
    enrich_stories(client, &mut stories, config.insights_batch_size).await;
    let stories_aggregate = aggregate_stories(&stories);

    let demographics = fetch_demographics(client, &config.ig_user_id, &mut messages).await?;
    if demographics.is_empty() && !messages.iter().any(|m| m.starts_with("demographics")) {
        messages.push("demographics empty for this account".to_string());
    }

    let online_followers = match client.get_online_followers(&config.ig_user_id).await {
        Ok(map) => map,
        Err(err) => {
            tracing::warn!(error = %err, "online followers unavailable");
            messages.push(format!("online followers unavailable: {err}"));
            BTreeMap::new()
        }
    };

    Ok(DashboardPayload {
        profile,
        media,
        stories,
        stories_aggregate,
        demographics,
        online_followers,
        messages,
    })
}

/// Fetches all four demographic breakdowns.
///
/// An audience-too-small API response is an expected absence: it empties
/// the demographics and records a message. Transport and auth failures
/// propagate — they would make every other breakdown lie by omission.
async fn fetch_demographics(
    client: &GraphClient,
    user_id: &str,
    messages: &mut Vec<String>,
) -> Result<Demographics, GraphError> {
    let mut demographics = Demographics::default();
    for breakdown in ["age", "gender", "country", "city"] {
        match client.get_follower_demographics(user_id, breakdown).await {
            Ok(map) => match breakdown {
                "age" => demographics.age = map,
                "gender" => demographics.gender = map,
                "country" => demographics.country = map,
                _ => demographics.city = map,
            },
            Err(GraphError::Api { code, .. }) if code == CODE_INSUFFICIENT_AUDIENCE => {
                tracing::info!("demographics unavailable: audience below reporting threshold");
                messages.push("demographics unavailable (audience too small)".to_string());
                return Ok(Demographics::default());
            }
            Err(err) => return Err(err),
        }
    }
    Ok(demographics)
}
