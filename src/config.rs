use crate::error::ConfigError;
use crate::filters::{SortBy, SortOrder};
use std::time::Duration;

/// Largest page the listings endpoint will serve
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Settings for talking to the listings backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub page_size: usize,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub timeout: Duration,
    pub user_agent: String,
    /// Bearer token for the favorites endpoints
    pub api_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("listing-feed/", env!("CARGO_PKG_VERSION")).to_string(),
            api_token: None,
        }
    }
}

impl ClientConfig {
    /// Build a config from `LISTINGS_*` environment variables, falling back
    /// to the defaults for anything unset
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("LISTINGS_API_URL") {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = get("LISTINGS_PAGE_SIZE") {
            let size: usize = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                var: "LISTINGS_PAGE_SIZE",
                value: raw.clone(),
                reason: "expected a positive integer".to_string(),
            })?;
            config.page_size = size.clamp(1, MAX_PAGE_SIZE);
        }

        if let Some(raw) = get("LISTINGS_SORT_BY") {
            config.sort_by = raw.parse().map_err(|reason| ConfigError::InvalidVar {
                var: "LISTINGS_SORT_BY",
                value: raw.clone(),
                reason,
            })?;
        }

        if let Some(raw) = get("LISTINGS_SORT_ORDER") {
            config.sort_order = raw.parse().map_err(|reason| ConfigError::InvalidVar {
                var: "LISTINGS_SORT_ORDER",
                value: raw.clone(),
                reason,
            })?;
        }

        if let Some(raw) = get("LISTINGS_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                var: "LISTINGS_TIMEOUT_SECS",
                value: raw.clone(),
                reason: "expected a whole number of seconds".to_string(),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidVar {
                    var: "LISTINGS_TIMEOUT_SECS",
                    value: raw,
                    reason: "timeout must be at least one second".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        config.api_token = get("LISTINGS_API_TOKEN").map(|t| t.trim().to_string());

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.sort_by, SortBy::DealScore);
        assert_eq!(config.sort_order, SortOrder::Desc);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("LISTINGS_API_URL", "https://api.example.ba/"),
            ("LISTINGS_PAGE_SIZE", "500"),
            ("LISTINGS_SORT_BY", "price"),
            ("LISTINGS_SORT_ORDER", "asc"),
            ("LISTINGS_API_TOKEN", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.ba");
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        assert_eq!(config.sort_by, SortBy::Price);
        assert_eq!(config.sort_order, SortOrder::Asc);
        assert_eq!(config.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn zero_page_size_is_clamped_up() {
        let config = ClientConfig::from_lookup(lookup(&[("LISTINGS_PAGE_SIZE", "0")])).unwrap();
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn rejects_garbage() {
        let err = ClientConfig::from_lookup(lookup(&[("LISTINGS_PAGE_SIZE", "lots")])).unwrap_err();
        assert!(err.to_string().contains("LISTINGS_PAGE_SIZE"));
        assert!(ClientConfig::from_lookup(lookup(&[("LISTINGS_SORT_BY", "newest")])).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err =
            ClientConfig::from_lookup(lookup(&[("LISTINGS_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar { var: "LISTINGS_TIMEOUT_SECS", .. }
        ));
        let config =
            ClientConfig::from_lookup(lookup(&[("LISTINGS_TIMEOUT_SECS", "5")])).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
