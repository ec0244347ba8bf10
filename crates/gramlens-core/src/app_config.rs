use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Long-lived Instagram Graph API access token.
    pub access_token: String,
    /// Instagram Business account id the dashboard reports on.
    pub ig_user_id: String,
    pub graph_base_url: String,
    pub graph_api_version: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Media items per paginated list request (Graph API caps this at 100).
    pub media_page_size: u32,
    /// Total media items fetched for the dashboard.
    pub media_fetch_limit: usize,
    /// Items enriched with insights per concurrent batch.
    pub insights_batch_size: usize,
    /// Cap on how many recent items get insight fetches. 0 = no cap.
    pub insights_media_limit: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("access_token", &"[redacted]")
            .field("ig_user_id", &self.ig_user_id)
            .field("graph_base_url", &self.graph_base_url)
            .field("graph_api_version", &self.graph_api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("media_page_size", &self.media_page_size)
            .field("media_fetch_limit", &self.media_fetch_limit)
            .field("insights_batch_size", &self.insights_batch_size)
            .field("insights_media_limit", &self.insights_media_limit)
            .finish()
    }
}
