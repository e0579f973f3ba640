//! Configuration schema definitions

use crate::cache::CacheConfig;
use crate::error::{Error, Result};
use crate::rate_limit::RateLimitConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[allow(missing_docs)]
pub struct ConfigSchema {
    #[serde(default)]
    pub geocode: GeocodeConfig,

    #[serde(default)]
    pub rate_limit: RateLimitSection,

    #[serde(default)]
    pub navigation: NavigationConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub gazetteer: GazetteerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Validate value ranges across all sections
    pub fn validate(&self) -> Result<()> {
        if self.geocode.cache_max_entries == 0 {
            return Err(Error::config_invalid("geocode.cache_max_entries must be at least 1"));
        }
        if self.geocode.batch_size == 0 {
            return Err(Error::config_invalid("geocode.batch_size must be at least 1"));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(Error::config_invalid("rate_limit.window_secs must be positive"));
        }
        if self.rate_limit.max_per_window == 0 {
            return Err(Error::config_invalid("rate_limit.max_per_window must be at least 1"));
        }
        if !(self.gazetteer.jitter_degrees >= 0.0 && self.gazetteer.jitter_degrees < 1.0) {
            return Err(Error::config_invalid("gazetteer.jitter_degrees must be in [0, 1)"));
        }
        if self.location.timeout_secs == 0 {
            return Err(Error::config_invalid("location.timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// Geocoding cache and batching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Maximum cached addresses
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// TTL for provider results, in seconds
    #[serde(default = "default_success_ttl_secs")]
    pub success_ttl_secs: u64,

    /// TTL for gazetteer fallbacks, in seconds
    #[serde(default = "default_fallback_ttl_secs")]
    pub fallback_ttl_secs: u64,

    /// Addresses resolved concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batches, in milliseconds
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Pause between queued provider calls, in milliseconds
    #[serde(default = "default_queue_delay_ms")]
    pub queue_delay_ms: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            cache_max_entries: default_cache_max_entries(),
            success_ttl_secs: default_success_ttl_secs(),
            fallback_ttl_secs: default_fallback_ttl_secs(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            queue_delay_ms: default_queue_delay_ms(),
        }
    }
}

impl GeocodeConfig {
    /// Cache settings derived from this section
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.cache_max_entries,
            default_ttl: self.fallback_ttl(),
        }
    }

    /// TTL for provider results
    #[must_use]
    pub fn success_ttl(&self) -> Duration {
        Duration::from_secs(self.success_ttl_secs)
    }

    /// TTL for gazetteer fallbacks
    #[must_use]
    pub fn fallback_ttl(&self) -> Duration {
        Duration::from_secs(self.fallback_ttl_secs)
    }

    /// Pause between batches
    #[must_use]
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Pause between queued provider calls
    #[must_use]
    pub fn queue_delay(&self) -> Duration {
        Duration::from_millis(self.queue_delay_ms)
    }
}

fn default_cache_max_entries() -> usize {
    1000
}

fn default_success_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_fallback_ttl_secs() -> u64 {
    60 * 60
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay_ms() -> u64 {
    200
}

fn default_queue_delay_ms() -> u64 {
    100
}

/// Outbound call limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSection {
    /// Maximum provider calls per window
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u32,

    /// Window length, in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Maximum provider calls per 24h
    #[serde(default = "default_daily_quota")]
    pub daily_quota: u32,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            max_per_window: default_max_per_window(),
            window_secs: default_window_secs(),
            daily_quota: default_daily_quota(),
        }
    }
}

impl From<&RateLimitSection> for RateLimitConfig {
    fn from(section: &RateLimitSection) -> Self {
        Self {
            max_requests: section.max_per_window,
            window: Duration::from_secs(section.window_secs),
            daily_quota: section.daily_quota,
        }
    }
}

fn default_max_per_window() -> u32 {
    100
}

fn default_window_secs() -> u64 {
    60
}

fn default_daily_quota() -> u32 {
    2500
}

/// Navigation link behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Minimum time between navigation requests, in milliseconds
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// How long a launcher waits for an app to take over, in milliseconds
    #[serde(default = "default_app_open_grace_ms")]
    pub app_open_grace_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            app_open_grace_ms: default_app_open_grace_ms(),
        }
    }
}

impl NavigationConfig {
    /// Cooldown between navigation requests
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Grace period for app-open detection
    #[must_use]
    pub fn app_open_grace(&self) -> Duration {
        Duration::from_millis(self.app_open_grace_ms)
    }
}

fn default_cooldown_ms() -> u64 {
    2000
}

fn default_app_open_grace_ms() -> u64 {
    2500
}

/// Device location acquisition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Give up on a position request after this many seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Accept a cached device position up to this age, in seconds
    #[serde(default = "default_maximum_age_secs")]
    pub maximum_age_secs: u64,

    /// Suppress watch updates that moved less than this, in meters
    #[serde(default = "default_min_movement_m")]
    pub min_movement_m: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            maximum_age_secs: default_maximum_age_secs(),
            min_movement_m: default_min_movement_m(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_maximum_age_secs() -> u64 {
    300
}

fn default_min_movement_m() -> f64 {
    10.0
}

/// Remote maps provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the maps API
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// API key; usually supplied through the environment instead
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout, in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            api_key: None,
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

fn default_provider_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

/// Offline fallback table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerConfig {
    /// Use the built-in place table
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Extra places, merged over the built-in table
    #[serde(default)]
    pub places: Vec<GazetteerPlace>,

    /// Centroid used when nothing matches, as `[lat, lng]`
    #[serde(default = "default_region")]
    pub default_region: [f64; 2],

    /// Fall back to the jittered centroid when no place matches
    #[serde(default = "default_true")]
    pub region_fallback: bool,

    /// Maximum jitter applied to the centroid, in degrees
    #[serde(default = "default_jitter_degrees")]
    pub jitter_degrees: f64,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            places: Vec::new(),
            default_region: default_region(),
            region_fallback: true,
            jitter_degrees: default_jitter_degrees(),
        }
    }
}

/// A named place in the gazetteer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerPlace {
    /// Place name, matched after normalization
    pub name: String,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

fn default_region() -> [f64; 2] {
    // Bangalore city center
    [12.9716, 77.5946]
}

fn default_jitter_degrees() -> f64 {
    0.01
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let schema = ConfigSchema::default();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.geocode.cache_max_entries, 1000);
        assert_eq!(schema.geocode.success_ttl(), Duration::from_secs(86_400));
        assert_eq!(schema.navigation.cooldown(), Duration::from_secs(2));
    }

    #[test]
    fn test_rate_limit_conversion() {
        let section = RateLimitSection {
            max_per_window: 5,
            window_secs: 10,
            daily_quota: 50,
        };
        let config = RateLimitConfig::from(&section);
        assert_eq!(config.max_requests, 5);
        assert_eq!(config.window, Duration::from_secs(10));
        assert_eq!(config.daily_quota, 50);
    }

    #[test]
    fn test_validation_rejects_zero_window() {
        let mut schema = ConfigSchema::default();
        schema.rate_limit.window_secs = 0;
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [geocode]
            batch_size = 10

            [gazetteer]
            default_region = [48.8566, 2.3522]

            [[gazetteer.places]]
            name = "Le Marais"
            lat = 48.8590
            lng = 2.3620
            "#,
        )
        .unwrap();

        assert_eq!(schema.geocode.batch_size, 10);
        assert_eq!(schema.geocode.cache_max_entries, 1000);
        assert_eq!(schema.gazetteer.places.len(), 1);
        assert!(schema.gazetteer.builtin);
        assert_eq!(schema.gazetteer.default_region, [48.8566, 2.3522]);
    }
}
