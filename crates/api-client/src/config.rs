//! Configuration for the maps client
//!
//! Built from the `[provider]` config section, then overridden by the
//! environment.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use storefinder_core::config::ProviderConfig;
use storefinder_core::retry::RetryConfig;

/// Default maps API root
pub const DEFAULT_MAPS_URL: &str = "https://maps.googleapis.com/maps/api";

/// Environment variable overriding the API root
pub const ENV_MAPS_URL: &str = "STOREFINDER_MAPS_URL";
/// Environment variable holding the API key
pub const ENV_MAPS_API_KEY: &str = "STOREFINDER_MAPS_API_KEY";
/// Environment variable overriding the request timeout, in seconds
pub const ENV_TIMEOUT_SECS: &str = "STOREFINDER_TIMEOUT_SECS";

/// Client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// API key sent as the `key` query parameter
    pub api_key: Option<String>,
    /// Request timeout
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_provider_config(&ProviderConfig::default())
    }
}

impl ClientConfig {
    /// Configuration from the `[provider]` section alone
    #[must_use]
    pub fn from_provider_config(provider: &ProviderConfig) -> Self {
        Self {
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key: provider.api_key.clone().filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(provider.timeout_secs),
            retry: RetryConfig::default(),
        }
    }

    /// Defaults overridden by the environment
    ///
    /// Reads `STOREFINDER_MAPS_URL`, `STOREFINDER_MAPS_API_KEY` and
    /// `STOREFINDER_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this configuration
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_MAPS_URL).filter(|u| !u.is_empty()) {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup(ENV_MAPS_API_KEY).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse().ok()) {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder-style method to set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// True when an API key is present
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if self.retry.max_attempts == 0 {
            return Err(ApiError::config("retry.max_attempts must be at least 1"));
        }

        if !self.has_api_key() {
            return Err(ApiError::MissingApiKey);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_MAPS_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::default().with_overrides(lookup(&[
            (ENV_MAPS_URL, "http://localhost:9000/maps/"),
            (ENV_MAPS_API_KEY, "abc"),
            (ENV_TIMEOUT_SECS, "3"),
        ]));

        assert_eq!(config.base_url, "http://localhost:9000/maps");
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let config = ClientConfig::default()
            .with_overrides(lookup(&[(ENV_TIMEOUT_SECS, "soon"), (ENV_MAPS_API_KEY, "")]));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_validation() {
        let valid = ClientConfig::default().with_api_key("k");
        assert!(valid.validate().is_ok());

        assert!(matches!(ClientConfig::default().validate(), Err(ApiError::MissingApiKey)));

        let invalid = valid.clone().with_base_url("ftp://example.com");
        assert!(invalid.validate().is_err());

        let invalid = valid.with_timeout(Duration::ZERO);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::default().with_api_key("secret-key");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
