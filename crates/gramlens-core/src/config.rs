use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let access_token = require("GRAMLENS_ACCESS_TOKEN")?;
    let ig_user_id = require("GRAMLENS_IG_USER_ID")?;

    let env = parse_environment(&or_default("GRAMLENS_ENV", "development"));

    let bind_addr = parse_addr("GRAMLENS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("GRAMLENS_LOG_LEVEL", "info");

    let graph_base_url = or_default("GRAMLENS_GRAPH_BASE_URL", "https://graph.facebook.com");
    let graph_api_version = or_default("GRAMLENS_GRAPH_API_VERSION", "v21.0");

    let request_timeout_secs = parse_u64("GRAMLENS_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("GRAMLENS_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("GRAMLENS_RETRY_BACKOFF_BASE_MS", "1000")?;

    let media_page_size = parse_u32("GRAMLENS_MEDIA_PAGE_SIZE", "50")?;
    let media_fetch_limit = parse_usize("GRAMLENS_MEDIA_FETCH_LIMIT", "100")?;
    let insights_batch_size = parse_usize("GRAMLENS_INSIGHTS_BATCH_SIZE", "50")?;
    let insights_media_limit = parse_usize("GRAMLENS_INSIGHTS_MEDIA_LIMIT", "0")?;

    if media_page_size == 0 || media_page_size > 100 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GRAMLENS_MEDIA_PAGE_SIZE".to_string(),
            reason: format!("must be between 1 and 100, got {media_page_size}"),
        });
    }

    if insights_batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GRAMLENS_INSIGHTS_BATCH_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        access_token,
        ig_user_id,
        graph_base_url,
        graph_api_version,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        media_page_size,
        media_fetch_limit,
        insights_batch_size,
        insights_media_limit,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated with valid defaults.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("GRAMLENS_ACCESS_TOKEN", "test-token");
        m.insert("GRAMLENS_IG_USER_ID", "17841400000000000");
        m
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_fails_without_access_token() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "GRAMLENS_ACCESS_TOKEN"),
            "expected MissingEnvVar(GRAMLENS_ACCESS_TOKEN), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_without_ig_user_id() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("GRAMLENS_ACCESS_TOKEN", "test-token");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "GRAMLENS_IG_USER_ID"),
            "expected MissingEnvVar(GRAMLENS_IG_USER_ID), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_applies_defaults() {
        let map = full_env();
        let config = build_app_config(lookup_from_map(&map)).expect("config should load");
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.graph_api_version, "v21.0");
        assert_eq!(config.media_page_size, 50);
        assert_eq!(config.insights_batch_size, 50);
        assert_eq!(config.insights_media_limit, 0);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn build_app_config_rejects_oversized_page_size() {
        let mut map = full_env();
        map.insert("GRAMLENS_MEDIA_PAGE_SIZE", "250");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GRAMLENS_MEDIA_PAGE_SIZE")
        );
    }

    #[test]
    fn build_app_config_rejects_zero_batch_size() {
        let mut map = full_env();
        map.insert("GRAMLENS_INSIGHTS_BATCH_SIZE", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GRAMLENS_INSIGHTS_BATCH_SIZE")
        );
    }

    #[test]
    fn build_app_config_rejects_invalid_bind_addr() {
        let mut map = full_env();
        map.insert("GRAMLENS_BIND_ADDR", "not-an-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "GRAMLENS_BIND_ADDR")
        );
    }

    #[test]
    fn debug_redacts_access_token() {
        let map = full_env();
        let config = build_app_config(lookup_from_map(&map)).expect("config should load");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("test-token"));
        assert!(rendered.contains("[redacted]"));
    }
}
