//! Provider wiring
//!
//! One limiter is shared by the geocoder and the directions service. Without
//! an API key, or with `--offline`, both run on the offline provider and
//! answer from the gazetteer or the straight-line estimate.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use storefinder_api_client::{ClientConfig, MapsClient};
use storefinder_core::config::ConfigSchema;
use storefinder_core::rate_limit::{RateLimitConfig, SlidingWindowLimiter};
use storefinder_geocode::{DirectionsService, Gazetteer, Geocoder, GeocoderConfig, OfflineProvider};
use tracing::{info, warn};

/// Geocoder and directions over the same provider
pub struct Services {
    pub geocoder: Geocoder,
    pub directions: DirectionsService,
    pub online: bool,
}

impl Services {
    pub fn build(config: &ConfigSchema, offline: bool) -> anyhow::Result<Self> {
        let limiter = Arc::new(SlidingWindowLimiter::new(RateLimitConfig::from(&config.rate_limit)));
        let gazetteer = Gazetteer::from_config(&config.gazetteer);
        let mut geocoder_config = GeocoderConfig::from(&config.geocode);
        let geocode = &config.geocode;

        match maps_client(config, offline)? {
            Some(client) => {
                info!(base_url = %client.base_url(), "using maps provider");
                let client = Arc::new(client);
                Ok(Self {
                    geocoder: Geocoder::new(Arc::clone(&client), Arc::clone(&limiter), gazetteer, geocoder_config),
                    directions: DirectionsService::new(
                        client,
                        limiter,
                        geocode.cache_config(),
                        geocode.success_ttl(),
                        geocode.fallback_ttl(),
                        geocode.queue_delay(),
                    ),
                    online: true,
                })
            }
            None => {
                // Nothing remote to pace
                geocoder_config.queue_delay = Duration::ZERO;
                geocoder_config.batch_delay = Duration::ZERO;
                let provider = Arc::new(OfflineProvider);
                Ok(Self {
                    geocoder: Geocoder::new(Arc::clone(&provider), Arc::clone(&limiter), gazetteer, geocoder_config),
                    directions: DirectionsService::new(
                        provider,
                        limiter,
                        geocode.cache_config(),
                        geocode.success_ttl(),
                        geocode.fallback_ttl(),
                        Duration::ZERO,
                    ),
                    online: false,
                })
            }
        }
    }
}

fn maps_client(config: &ConfigSchema, offline: bool) -> anyhow::Result<Option<MapsClient>> {
    if offline {
        return Ok(None);
    }
    let client_config = ClientConfig::from_provider_config(&config.provider).with_env_overrides();
    if !client_config.has_api_key() {
        warn!("no maps API key configured, using offline gazetteer");
        return Ok(None);
    }
    MapsClient::with_config(client_config)
        .map(Some)
        .context("invalid maps provider configuration")
}
