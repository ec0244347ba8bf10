//! HTTP client for the Instagram Business Graph API.
//!
//! Wraps `reqwest` with Graph-specific error handling, access-token
//! management, and typed response deserialization. Every endpoint checks for
//! the `{"error": {...}}` envelope and surfaces API-level failures as
//! [`GraphError::Api`] (or [`GraphError::Auth`] for token problems).

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Url};

use gramlens_core::AppConfig;
use gramlens_metrics::RawInsightsBag;

use crate::error::GraphError;
use crate::insights::{parse_hour_map, parse_insight_bag};
use crate::retry::retry_with_backoff;
use crate::types::{DemographicsResponse, GraphMedia, InsightsResponse, Paged, Profile};

/// Maximum number of media-list pages to follow before returning an error.
/// Prevents infinite loops on cycling cursors.
const MAX_PAGES: usize = 50;

const MEDIA_FIELDS: &str = "id,caption,media_type,media_product_type,media_url,thumbnail_url,permalink,timestamp,like_count,comments_count";

const PROFILE_FIELDS: &str =
    "id,username,name,biography,website,profile_picture_url,followers_count,follows_count,media_count";

const STORY_FIELDS: &str = "id,media_type,media_url,permalink,timestamp";

/// Client for the Instagram Business Graph API.
///
/// Manages the HTTP client, access token, API version, and base URL. Use
/// [`GraphClient::new`] for production or [`GraphClient::with_base_url`] to
/// point at a mock server in tests.
pub struct GraphClient {
    client: Client,
    access_token: String,
    api_version: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GraphClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GraphError::InvalidBaseUrl`] if the
    /// configured base URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, GraphError> {
        let mut client = Self::with_base_url(
            &config.access_token,
            &config.graph_api_version,
            config.request_timeout_secs,
            &config.graph_base_url,
        )?;
        client.max_retries = config.max_retries;
        client.backoff_base_ms = config.retry_backoff_base_ms;
        Ok(client)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    /// Retries are disabled; [`GraphClient::new`] enables the configured
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GraphError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("gramlens/0.1 (instagram-analytics)")
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| GraphError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            api_version: api_version.to_owned(),
            base_url,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Fetches the business account profile.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Auth`] if the access token is rejected.
    /// - [`GraphError::Api`] on any other Graph-level error.
    /// - [`GraphError::Http`] on network failure.
    /// - [`GraphError::Deserialize`] if the response shape is unexpected.
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, GraphError> {
        let url = self.build_url(user_id, &[("fields", PROFILE_FIELDS)]);
        let body = self.request_json(&url).await?;
        from_value(body, format!("get_profile({user_id})"))
    }

    /// Fetches one page of the account's media list.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GraphClient::get_profile`].
    pub async fn get_media_page(
        &self,
        user_id: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<Paged<GraphMedia>, GraphError> {
        let limit = limit.to_string();
        let mut params = vec![("fields", MEDIA_FIELDS), ("limit", limit.as_str())];
        if let Some(cursor) = after {
            params.push(("after", cursor));
        }
        let url = self.build_url(&format!("{user_id}/media"), &params);
        let body = self.request_json(&url).await?;
        from_value(body, format!("get_media_page({user_id})"))
    }

    /// Fetches up to `max_items` recent media records, following pagination
    /// cursors. `max_items == 0` means no cap.
    ///
    /// # Errors
    ///
    /// Propagates any page error, plus [`GraphError::PaginationLimit`] if
    /// the cursor chain exceeds the internal page guard.
    pub async fn get_all_media(
        &self,
        user_id: &str,
        page_size: u32,
        max_items: usize,
    ) -> Result<Vec<GraphMedia>, GraphError> {
        let mut all: Vec<GraphMedia> = Vec::new();
        let mut after: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(GraphError::PaginationLimit {
                    user_id: user_id.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let page = self
                .get_media_page(user_id, page_size, after.as_deref())
                .await?;
            let got = page.data.len();
            all.extend(page.data);

            if max_items > 0 && all.len() >= max_items {
                all.truncate(max_items);
                break;
            }

            after = page
                .paging
                .and_then(|p| p.cursors)
                .and_then(|c| c.after)
                .filter(|_| got > 0);
            if after.is_none() {
                break;
            }
        }

        Ok(all)
    }

    /// Runs one insight query for a media item with an explicit metric set.
    ///
    /// This is the single-candidate primitive; the fallback policy lives in
    /// [`crate::insights::fetch_media_insights`].
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GraphClient::get_profile`].
    pub async fn get_media_insights(
        &self,
        media_id: &str,
        metrics: &str,
    ) -> Result<RawInsightsBag, GraphError> {
        let url = self.build_url(&format!("{media_id}/insights"), &[("metric", metrics)]);
        let body = self.request_json(&url).await?;
        let response: InsightsResponse =
            from_value(body, format!("get_media_insights({media_id})"))?;
        Ok(parse_insight_bag(&response))
    }

    /// Fetches the current (≤24h old) story frames.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GraphClient::get_profile`].
    pub async fn get_stories(&self, user_id: &str) -> Result<Vec<GraphMedia>, GraphError> {
        let url = self.build_url(&format!("{user_id}/stories"), &[("fields", STORY_FIELDS)]);
        let body = self.request_json(&url).await?;
        let page: Paged<GraphMedia> = from_value(body, format!("get_stories({user_id})"))?;
        Ok(page.data)
    }

    /// Fetches one follower-demographics breakdown (`age`, `gender`,
    /// `country`, or `city`) as a dimension → follower-count map.
    ///
    /// An account below the audience-size threshold yields an empty map via
    /// an empty `data` array, not an error.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GraphClient::get_profile`].
    pub async fn get_follower_demographics(
        &self,
        user_id: &str,
        breakdown: &str,
    ) -> Result<BTreeMap<String, f64>, GraphError> {
        let url = self.build_url(
            &format!("{user_id}/insights"),
            &[
                ("metric", "follower_demographics"),
                ("period", "lifetime"),
                ("metric_type", "total_value"),
                ("breakdown", breakdown),
            ],
        );
        let body = self.request_json(&url).await?;
        let response: DemographicsResponse =
            from_value(body, format!("get_follower_demographics({user_id}, {breakdown})"))?;

        let mut map = BTreeMap::new();
        for entry in response.data {
            let Some(total) = entry.total_value else {
                continue;
            };
            for series in total.breakdowns {
                for result in series.results {
                    map.insert(result.dimension_values.join("/"), result.value);
                }
            }
        }
        Ok(map)
    }

    /// Fetches the hour-of-day map of when followers are online.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GraphClient::get_profile`].
    pub async fn get_online_followers(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<String, f64>, GraphError> {
        let url = self.build_url(
            &format!("{user_id}/insights"),
            &[("metric", "online_followers"), ("period", "lifetime")],
        );
        let body = self.request_json(&url).await?;
        let response: InsightsResponse =
            from_value(body, format!("get_online_followers({user_id})"))?;
        Ok(parse_hour_map(&response))
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters. The access token is always the first parameter; `path`
    /// is prefixed with the API version.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}/{}", self.api_version, path));
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("access_token", &self.access_token);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request with the configured retry policy and parses the
    /// response body as JSON, surfacing Graph error envelopes as typed
    /// errors.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, GraphError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_once(url)
        })
        .await
    }

    async fn send_once(&self, url: &Url) -> Result<serde_json::Value, GraphError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => {
                Self::check_api_error(&value)?;
                if status.is_success() {
                    Ok(value)
                } else {
                    Err(GraphError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    })
                }
            }
            Err(e) if status.is_success() => Err(GraphError::Deserialize {
                context: url.to_string(),
                source: e,
            }),
            Err(_) => Err(GraphError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    /// Maps the Graph `{"error": {...}}` envelope onto [`GraphError::Auth`]
    /// or [`GraphError::Api`].
    ///
    /// Auth is keyed on error codes 190 (invalid/expired token) and 102
    /// (invalid session), not on the `type` field: the API labels plenty of
    /// non-auth failures `OAuthException` (e.g. code 10 permission errors).
    fn check_api_error(body: &serde_json::Value) -> Result<(), GraphError> {
        let Some(error) = body.get("error") else {
            return Ok(());
        };
        let message = error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        let code = error
            .get("code")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(0);

        if code == 190 || code == 102 {
            return Err(GraphError::Auth(message));
        }
        Err(GraphError::Api { message, code })
    }
}

fn from_value<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    context: String,
) -> Result<T, GraphError> {
    serde_json::from_value(value).map_err(|e| GraphError::Deserialize { context, source: e })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
