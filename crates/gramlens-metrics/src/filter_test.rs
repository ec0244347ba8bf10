use chrono::{TimeZone, Utc};

use super::*;
use crate::normalize::normalize_media;
use crate::types::RawInsightsBag;

fn item(id: &str, caption: Option<&str>, y: i32, mo: u32, d: u32) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        caption: caption.map(ToOwned::to_owned),
        media_type: "IMAGE".to_string(),
        media_product_type: None,
        media_url: None,
        thumbnail_url: None,
        permalink: None,
        timestamp: Some(Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap()),
        like_count: 0,
        comments_count: 0,
        insights: RawInsightsBag::new(),
        computed: None,
    }
}

fn normalized(id: &str, likes: i64, raw: &[(&str, f64)]) -> MediaItem {
    let mut it = item(id, None, 2025, 6, 1);
    it.like_count = likes;
    let bag: RawInsightsBag = raw
        .iter()
        .map(|(k, v)| ((*k).to_string(), *v))
        .collect();
    normalize_media(&mut it, &bag, Some(1000.0));
    it
}

#[test]
fn default_filter_matches_everything() {
    let filter = MediaFilter::default();
    assert!(filter.matches(&item("a", None, 2025, 1, 1)));

    let mut no_ts = item("b", None, 2025, 1, 1);
    no_ts.timestamp = None;
    assert!(filter.matches(&no_ts));
}

#[test]
fn date_range_is_inclusive() {
    let filter = MediaFilter {
        since: Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()),
        until: Some(Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()),
        ..MediaFilter::default()
    };
    assert!(filter.matches(&item("lo", None, 2025, 6, 1)));
    assert!(filter.matches(&item("hi", None, 2025, 6, 30)));
    assert!(!filter.matches(&item("before", None, 2025, 5, 31)));
    assert!(!filter.matches(&item("after", None, 2025, 7, 1)));
}

#[test]
fn missing_timestamp_excluded_when_range_active() {
    let filter = MediaFilter {
        since: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
        ..MediaFilter::default()
    };
    let mut no_ts = item("a", None, 2025, 6, 1);
    no_ts.timestamp = None;
    assert!(!filter.matches(&no_ts));
}

#[test]
fn weekday_filter() {
    // 2025-06-02 is a Monday.
    let filter = MediaFilter {
        weekday: Some(chrono::Weekday::Mon),
        ..MediaFilter::default()
    };
    assert!(filter.matches(&item("mon", None, 2025, 6, 2)));
    assert!(!filter.matches(&item("tue", None, 2025, 6, 3)));
}

#[test]
fn kind_filter_matches_reels_via_product_type() {
    let filter = MediaFilter {
        kind: Some(MediaKind::Reel),
        ..MediaFilter::default()
    };
    let mut reel = item("r", None, 2025, 6, 2);
    reel.media_type = "VIDEO".to_string();
    reel.media_product_type = Some("REELS".to_string());
    let mut video = item("v", None, 2025, 6, 2);
    video.media_type = "VIDEO".to_string();

    assert!(filter.matches(&reel));
    assert!(!filter.matches(&video));
}

#[test]
fn search_is_case_insensitive_over_caption_and_id() {
    let filter = MediaFilter {
        search: Some("LAUNCH".to_string()),
        ..MediaFilter::default()
    };
    assert!(filter.matches(&item("a", Some("Launch day!"), 2025, 6, 2)));
    assert!(!filter.matches(&item("b", Some("nothing here"), 2025, 6, 2)));

    let by_id = MediaFilter {
        search: Some("900".to_string()),
        ..MediaFilter::default()
    };
    assert!(by_id.matches(&item("17900123", None, 2025, 6, 2)));
}

#[test]
fn week_of_month_buckets() {
    assert_eq!(
        week_of_month(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
        1
    );
    assert_eq!(
        week_of_month(Utc.with_ymd_and_hms(2025, 6, 7, 0, 0, 0).unwrap()),
        1
    );
    assert_eq!(
        week_of_month(Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap()),
        2
    );
    assert_eq!(
        week_of_month(Utc.with_ymd_and_hms(2025, 6, 29, 0, 0, 0).unwrap()),
        5
    );

    let filter = MediaFilter {
        week_of_month: Some(2),
        ..MediaFilter::default()
    };
    assert!(filter.matches(&item("a", None, 2025, 6, 10)));
    assert!(!filter.matches(&item("b", None, 2025, 6, 2)));
}

#[test]
fn sort_descending_with_stable_ties() {
    let a = normalized("a", 10, &[]);
    let b = normalized("b", 30, &[]);
    let c = normalized("c", 10, &[]);
    let items = vec![a, b, c];

    let mut refs: Vec<&MediaItem> = items.iter().collect();
    sort_by_metric(&mut refs, SortKey::Likes);
    let ids: Vec<&str> = refs.iter().map(|i| i.id.as_str()).collect();
    // "a" and "c" tie on likes=10 and must keep input order.
    assert_eq!(ids, vec!["b", "a", "c"]);
}

#[test]
fn unavailable_metric_sorts_last() {
    let with_reach = normalized("a", 1, &[("reach", 50.0)]);
    let without = normalized("b", 99, &[]);
    let items = vec![without, with_reach];

    let mut refs: Vec<&MediaItem> = items.iter().collect();
    sort_by_metric(&mut refs, SortKey::Reach);
    let ids: Vec<&str> = refs.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn sort_key_parses_from_str() {
    assert_eq!("score".parse::<SortKey>(), Ok(SortKey::Score));
    assert_eq!(
        "interactions_per_1000_reach".parse::<SortKey>(),
        Ok(SortKey::InteractionsPer1000Reach)
    );
    assert!("bogus".parse::<SortKey>().is_err());
}

#[test]
fn apply_preserves_input_order() {
    let items = vec![
        item("a", Some("x"), 2025, 6, 2),
        item("b", Some("y"), 2025, 6, 3),
        item("c", Some("x"), 2025, 6, 4),
    ];
    let filter = MediaFilter {
        search: Some("x".to_string()),
        ..MediaFilter::default()
    };
    let kept: Vec<&str> = filter.apply(&items).iter().map(|i| i.id.as_str()).collect();
    assert_eq!(kept, vec!["a", "c"]);
}
