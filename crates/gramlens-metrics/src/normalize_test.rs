use super::*;

fn bag(entries: &[(&str, f64)]) -> RawInsightsBag {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), *v))
        .collect()
}

fn media_item(like_count: i64, comments_count: i64) -> MediaItem {
    MediaItem {
        id: "17900000000000001".to_string(),
        caption: Some("launch day".to_string()),
        media_type: "IMAGE".to_string(),
        media_product_type: None,
        media_url: None,
        thumbnail_url: None,
        permalink: None,
        timestamp: None,
        like_count,
        comments_count,
        insights: RawInsightsBag::new(),
        computed: None,
    }
}

#[test]
fn reference_scenario() {
    // likes=10, comments=2, bag {reach:200, saved:3}, followers=1000.
    let bag = bag(&[("reach", 200.0), ("saved", 3.0)]);
    let m = compute_metrics(10, 2, &bag, Some(1000.0));

    assert_eq!(m.engagement, 15);
    assert_eq!(m.score, 10 + 4 + 9);
    assert_eq!(m.er, Some(1.5));
    assert_eq!(m.reach_rate, Some(20.0));
    assert_eq!(m.views, None);
    assert_eq!(m.views_rate, None);
    assert_eq!(m.interactions_per_1000_reach, Some(75.0));
    assert!(m.is_partial);
    assert_eq!(m.missing_metrics, vec!["shares", "views"]);
    assert!(m.has_insights);
}

#[test]
fn engagement_computable_from_native_counters_alone() {
    let m = compute_metrics(7, 3, &RawInsightsBag::new(), None);
    assert_eq!(m.engagement, 10);
    assert_eq!(m.score, 7 + 6);
    assert!(!m.has_insights);
    assert!(m.is_partial);
    assert_eq!(m.missing_metrics, vec!["saves", "shares", "reach", "views"]);
}

#[test]
fn reach_zero_is_not_missing() {
    let bag = bag(&[("reach", 0.0)]);
    let m = compute_metrics(1, 0, &bag, None);
    assert_eq!(m.reach, Some(0.0));
    assert!(!m.missing_metrics.iter().any(|s| s == "reach"));
    // Zero reach still disables reach-denominated rates.
    assert_eq!(m.views_rate, None);
    assert_eq!(m.interactions_per_1000_reach, None);
}

#[test]
fn er_guards_against_bad_follower_counts() {
    let bag = bag(&[("reach", 50.0)]);
    for followers in [None, Some(0.0), Some(-10.0), Some(f64::NAN), Some(f64::INFINITY)] {
        let m = compute_metrics(5, 0, &bag, followers);
        assert_eq!(m.er, None, "followers={followers:?}");
        assert_eq!(m.reach_rate, None, "followers={followers:?}");
    }
}

#[test]
fn views_rate_requires_positive_reach() {
    let m = compute_metrics(0, 0, &bag(&[("reach", 0.0), ("views", 10.0)]), None);
    assert_eq!(m.views_rate, None);

    let m = compute_metrics(0, 0, &bag(&[("views", 10.0)]), None);
    assert_eq!(m.views_rate, None);

    let m = compute_metrics(0, 0, &bag(&[("reach", 40.0), ("views", 10.0)]), None);
    assert_eq!(m.views_rate, Some(25.0));
}

#[test]
fn saves_synonym_precedence_and_source() {
    let m = compute_metrics(0, 0, &bag(&[("saved", 5.0), ("saves", 9.0)]), None);
    assert_eq!(m.saves, Some(5.0));

    let m = compute_metrics(0, 0, &bag(&[("views", 12.0)]), None);
    assert_eq!(m.views_source.as_deref(), Some("views"));
}

#[test]
fn total_interactions_falls_back_to_engagement_key() {
    let m = compute_metrics(0, 0, &bag(&[("engagement", 44.0)]), None);
    assert_eq!(m.total_interactions, Some(44.0));

    let m = compute_metrics(0, 0, &bag(&[("total_interactions", 9.0), ("engagement", 44.0)]), None);
    assert_eq!(m.total_interactions, Some(9.0));
}

#[test]
fn score_weights() {
    let bag = bag(&[("saved", 2.0), ("shares", 3.0)]);
    let m = compute_metrics(4, 5, &bag, None);
    assert_eq!(m.engagement, 4 + 5 + 2 + 3);
    assert_eq!(m.score, 4 + 10 + 6 + 12);
}

#[test]
fn normalize_media_merges_canonical_keys() {
    let mut item = media_item(10, 2);
    let raw = bag(&[("reach", 200.0), ("saved", 3.0)]);
    normalize_media(&mut item, &raw, Some(1000.0));

    let computed = item.computed.as_ref().expect("computed should be set");
    assert_eq!(computed.engagement, 15);
    assert_eq!(item.insights.get("saves"), Some(&3.0));
    assert_eq!(item.insights.get("saved"), Some(&3.0));
    assert_eq!(item.insights.get("reach"), Some(&200.0));
    assert!(!item.insights.contains_key("views"));
}

#[test]
fn normalization_is_idempotent() {
    let mut item = media_item(10, 2);
    let raw = bag(&[("reach", 200.0), ("saved", 3.0), ("engagement", 15.0)]);
    normalize_media(&mut item, &raw, Some(1000.0));
    let first = item.computed.clone().expect("computed should be set");

    // Feed the normalized bag back through as if it were the raw fetch.
    let stored = item.insights.clone();
    normalize_media(&mut item, &stored, Some(1000.0));
    let second = item.computed.clone().expect("computed should be set");

    assert_eq!(first, second);
}

#[test]
fn all_metrics_present_is_not_partial() {
    let raw = bag(&[
        ("views", 500.0),
        ("reach", 400.0),
        ("saved", 6.0),
        ("shares", 2.0),
        ("total_interactions", 30.0),
    ]);
    let m = compute_metrics(20, 2, &raw, Some(2000.0));
    assert!(!m.is_partial);
    assert!(m.missing_metrics.is_empty());
    assert_eq!(m.engagement, 30);
    assert_eq!(m.views_rate, Some(125.0));
}
