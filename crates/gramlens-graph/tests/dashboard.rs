//! End-to-end dashboard assembly against a mocked Graph API.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gramlens_core::{AppConfig, Environment};
use gramlens_graph::{build_dashboard, GraphClient};

const IG_USER: &str = "17841400000000000";

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "info".to_string(),
        access_token: "test-token".to_string(),
        ig_user_id: IG_USER.to_string(),
        graph_base_url: base_url.to_string(),
        graph_api_version: "v21.0".to_string(),
        request_timeout_secs: 5,
        max_retries: 0,
        retry_backoff_base_ms: 0,
        media_page_size: 50,
        media_fetch_limit: 100,
        insights_batch_size: 50,
        insights_media_limit: 0,
    }
}

fn test_client(base_url: &str) -> GraphClient {
    GraphClient::with_base_url("test-token", "v21.0", 5, base_url)
        .expect("client construction should not fail")
}

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/v21.0/{IG_USER}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "id": IG_USER,
            "username": "coffee.lab",
            "followers_count": 1000,
            "media_count": 2
        })))
        .mount(server)
        .await;
}

async fn mount_demographics(server: &MockServer, body: &serde_json::Value, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/v21.0/{IG_USER}/insights")))
        .and(query_param("metric", "follower_demographics"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .with_priority(1)
        .mount(server)
        .await;
}

async fn mount_online_followers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/v21.0/{IG_USER}/insights")))
        .and(query_param("metric", "online_followers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "data": [{"name": "online_followers", "values": [{"value": {"9": 40, "18": 95}}]}]
        })))
        .with_priority(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn builds_full_payload_with_partial_insight_message() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/v21.0/{IG_USER}/media")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "data": [
                {"id": "1001", "media_type": "IMAGE", "caption": "launch",
                 "timestamp": "2025-07-01T12:00:00+0000", "like_count": 10, "comments_count": 2},
                {"id": "1002", "media_type": "VIDEO", "media_product_type": "REELS",
                 "timestamp": "2025-06-30T09:00:00+0000", "like_count": 4, "comments_count": 1}
            ],
            "paging": {"cursors": {}}
        })))
        .mount(&server)
        .await;

    for media_id in ["1001", "1002"] {
        Mock::given(method("GET"))
            .and(path(format!("/v21.0/{media_id}/insights")))
            .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
                "data": [{"name": "reach", "values": [{"value": 200}]},
                         {"name": "saved", "values": [{"value": 3}]}]
            })))
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(format!("/v21.0/{IG_USER}/stories")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "data": [{"id": "2001", "media_type": "STORY", "timestamp": "2025-07-02T07:00:00+0000"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v21.0/2001/insights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "data": [{"name": "views", "values": [{"value": 100}]},
                     {"name": "exits", "values": [{"value": 20}]},
                     {"name": "replies", "values": [{"value": 5}]}]
        })))
        .mount(&server)
        .await;

    mount_demographics(
        &server,
        &json!({
            "data": [{
                "name": "follower_demographics",
                "total_value": {"breakdowns": [{
                    "results": [{"dimension_values": ["25-34"], "value": 430}]
                }]}
            }]
        }),
        200,
    )
    .await;
    mount_online_followers(&server).await;

    let client = test_client(&server.uri());
    let config = test_config(&server.uri());
    let payload = build_dashboard(&client, &config)
        .await
        .expect("dashboard should build");

    assert_eq!(payload.media.len(), 2);
    let first = payload.media[0].computed.as_ref().expect("normalized");
    assert_eq!(first.engagement, 15);
    assert_eq!(first.er, Some(1.5));
    assert_eq!(first.reach_rate, Some(20.0));
    assert!(first.is_partial);

    assert_eq!(payload.stories_aggregate.total_stories, 1);
    assert!((payload.stories_aggregate.total_views - 100.0).abs() < f64::EPSILON);
    assert_eq!(payload.stories_aggregate.avg_completion_rate, 80);

    assert_eq!(payload.demographics.age.get("25-34"), Some(&430.0));
    assert_eq!(payload.online_followers.get("18"), Some(&95.0));

    assert!(
        payload
            .messages
            .iter()
            .any(|m| m == "2 of 2 posts have incomplete insights"),
        "messages: {:?}",
        payload.messages
    );
}

#[tokio::test]
async fn small_audience_demographics_degrade_with_message() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/v21.0/{IG_USER}/media")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v21.0/{IG_USER}/stories")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"data": []})))
        .mount(&server)
        .await;
    mount_demographics(
        &server,
        &json!({"error": {"message": "Not enough viewers for the media to show insights",
                           "type": "OAuthException", "code": 10}}),
        400,
    )
    .await;
    mount_online_followers(&server).await;

    let client = test_client(&server.uri());
    let config = test_config(&server.uri());
    let payload = build_dashboard(&client, &config)
        .await
        .expect("small-audience demographics must not fail the dashboard");

    assert!(payload.demographics.is_empty());
    assert!(payload
        .messages
        .iter()
        .any(|m| m.contains("audience too small")));
}

#[tokio::test]
async fn profile_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v21.0/{IG_USER}")))
        .respond_with(ResponseTemplate::new(500).set_body_json(&json!({
            "error": {"message": "An unknown error occurred", "type": "Unknown", "code": 1}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let config = test_config(&server.uri());
    let result = build_dashboard(&client, &config).await;
    assert!(result.is_err(), "profile failure must abort the build");
}
