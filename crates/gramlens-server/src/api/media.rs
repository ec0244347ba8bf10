use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use gramlens_graph::build_dashboard;
use gramlens_metrics::aggregate::{
    aggregate, aggregate_by_hour, aggregate_by_kind, aggregate_by_week, aggregate_by_weekday,
};
use gramlens_metrics::filter::sort_by_metric;
use gramlens_metrics::{MediaAggregate, MediaFilter, MediaItem, MediaKind, SortKey};

use crate::middleware::RequestId;

use super::{map_graph_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(super) struct MediaQuery {
    /// Inclusive start date, `YYYY-MM-DD`.
    pub since: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`.
    pub until: Option<String>,
    pub weekday: Option<String>,
    pub media_type: Option<String>,
    pub q: Option<String>,
    pub week_of_month: Option<u32>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct Bucket {
    key: String,
    aggregate: MediaAggregate,
}

#[derive(Debug, Serialize)]
pub(super) struct MediaListData {
    count: usize,
    aggregate: MediaAggregate,
    by_weekday: Vec<Bucket>,
    by_hour: Vec<Bucket>,
    by_media_type: Vec<Bucket>,
    by_week: Vec<Bucket>,
    items: Vec<MediaItem>,
}

pub(super) async fn list_media(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MediaQuery>,
) -> Result<Json<ApiResponse<MediaListData>>, ApiError> {
    let (filter, sort) = parse_query(&query)
        .map_err(|reason| ApiError::new(req_id.0.clone(), "bad_request", reason))?;

    let payload = build_dashboard(&state.client, &state.config)
        .await
        .map_err(|e| map_graph_error(req_id.0.clone(), &e))?;

    let mut refs = filter.apply(&payload.media);
    if let Some(key) = sort {
        sort_by_metric(&mut refs, key);
    }
    let items: Vec<MediaItem> = refs.into_iter().cloned().collect();

    let data = MediaListData {
        count: items.len(),
        aggregate: aggregate(&items),
        by_weekday: buckets(aggregate_by_weekday(&items)),
        by_hour: buckets(
            aggregate_by_hour(&items)
                .into_iter()
                .map(|(hour, agg)| (format!("{hour:02}"), agg))
                .collect(),
        ),
        by_media_type: buckets(
            aggregate_by_kind(&items)
                .into_iter()
                .map(|(kind, agg)| (kind.to_string(), agg))
                .collect(),
        ),
        by_week: buckets(aggregate_by_week(&items)),
        items,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn buckets(entries: Vec<(String, MediaAggregate)>) -> Vec<Bucket> {
    entries
        .into_iter()
        .map(|(key, aggregate)| Bucket { key, aggregate })
        .collect()
}

/// Translates query parameters into a filter and optional sort key.
///
/// Every parse failure is reported with the offending parameter name so the
/// caller can fix the request.
fn parse_query(query: &MediaQuery) -> Result<(MediaFilter, Option<SortKey>), String> {
    let since = query
        .since
        .as_deref()
        .map(|s| day_bound(s, false))
        .transpose()
        .map_err(|e| format!("invalid since: {e}"))?;
    let until = query
        .until
        .as_deref()
        .map(|s| day_bound(s, true))
        .transpose()
        .map_err(|e| format!("invalid until: {e}"))?;

    let weekday = query
        .weekday
        .as_deref()
        .map(|s| {
            s.parse::<Weekday>()
                .map_err(|_| format!("invalid weekday: {s}"))
        })
        .transpose()?;

    let kind = query
        .media_type
        .as_deref()
        .map(parse_media_kind)
        .transpose()?;

    if let Some(week) = query.week_of_month {
        if !(1..=5).contains(&week) {
            return Err(format!("invalid week_of_month: {week} (expected 1-5)"));
        }
    }

    let sort = query
        .sort
        .as_deref()
        .map(str::parse::<SortKey>)
        .transpose()?;

    Ok((
        MediaFilter {
            since,
            until,
            weekday,
            kind,
            search: query.q.clone(),
            week_of_month: query.week_of_month,
        },
        sort,
    ))
}

/// Parses `YYYY-MM-DD` into the first or last instant of that UTC day, so
/// both range bounds stay inclusive.
fn day_bound(s: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string())?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|naive| naive.and_utc())
        .ok_or_else(|| "invalid time of day".to_string())
}

fn parse_media_kind(s: &str) -> Result<MediaKind, String> {
    match s.to_lowercase().as_str() {
        "image" => Ok(MediaKind::Image),
        "video" => Ok(MediaKind::Video),
        "carousel" | "carousel_album" => Ok(MediaKind::CarouselAlbum),
        "reel" | "reels" => Ok(MediaKind::Reel),
        other => Err(format!("invalid media_type: {other}")),
    }
}
