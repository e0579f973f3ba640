//! Cached, rate-limited address resolution

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use storefinder_core::cache::{CacheConfig, TtlCache};
use storefinder_core::clock::SharedClock;
use storefinder_core::config::GeocodeConfig;
use storefinder_core::rate_limit::SlidingWindowLimiter;
use storefinder_geo::{validate_coordinate, Coordinate};
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::gazetteer::Gazetteer;
use crate::normalize::normalize_address;
use crate::provider::GeocodeProvider;
use crate::queue::{QueueOutcome, RequestQueue};

/// Tunables for [`Geocoder`].
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Cache bounds and default TTL
    pub cache: CacheConfig,
    /// TTL for provider answers
    pub success_ttl: Duration,
    /// TTL for gazetteer answers and misses
    pub fallback_ttl: Duration,
    /// Addresses resolved concurrently per batch chunk
    pub batch_size: usize,
    /// Pause between batch chunks
    pub batch_delay: Duration,
    /// Pause between provider calls
    pub queue_delay: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self::from(&GeocodeConfig::default())
    }
}

impl From<&GeocodeConfig> for GeocoderConfig {
    fn from(config: &GeocodeConfig) -> Self {
        Self {
            cache: config.cache_config(),
            success_ttl: config.success_ttl(),
            fallback_ttl: config.fallback_ttl(),
            batch_size: config.batch_size.max(1),
            batch_delay: config.batch_delay(),
            queue_delay: config.queue_delay(),
        }
    }
}

/// One entry of a batch result, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAddress {
    /// Address as given
    pub address: String,
    /// Resolved coordinate, if any
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    provider_calls: AtomicU64,
    fallbacks: AtomicU64,
}

/// Point-in-time view of geocoder activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Cache hits, including cached misses
    pub hits: u64,
    /// Lookups that went past the cache
    pub misses: u64,
    /// Calls that reached the provider
    pub provider_calls: u64,
    /// Answers served from the gazetteer (or nothing)
    pub fallbacks: u64,
    /// Live cache entries
    pub cache_entries: usize,
}

type Lookup = Result<Option<Coordinate>>;

/// Per-key gate; the holder is the one lookup allowed past the cache.
type KeyGate = Arc<tokio::sync::Mutex<()>>;

/// Resolves addresses through cache, provider and gazetteer.
///
/// Never returns an error: provider failures, rate limiting and invalid
/// provider output all end in the gazetteer fallback.
pub struct Geocoder {
    cache: Mutex<TtlCache<String, Option<Coordinate>>>,
    in_flight: Mutex<HashMap<String, KeyGate>>,
    queue: RequestQueue<String, Lookup>,
    gazetteer: Gazetteer,
    rng: Mutex<StdRng>,
    config: GeocoderConfig,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geocoder")
            .field("queue", &self.queue)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Geocoder {
    /// Create a geocoder over `provider`, sharing `limiter` with other
    /// provider clients.
    pub fn new<P: GeocodeProvider>(
        provider: Arc<P>,
        limiter: Arc<SlidingWindowLimiter>,
        gazetteer: Gazetteer,
        config: GeocoderConfig,
    ) -> Self {
        let cache = TtlCache::new(config.cache.clone());
        Self::build(provider, limiter, gazetteer, config, cache)
    }

    /// Like [`Geocoder::new`] but with an injected clock for cache expiry.
    pub fn with_clock<P: GeocodeProvider>(
        provider: Arc<P>,
        limiter: Arc<SlidingWindowLimiter>,
        gazetteer: Gazetteer,
        config: GeocoderConfig,
        clock: SharedClock,
    ) -> Self {
        let cache = TtlCache::with_clock(config.cache.clone(), clock);
        Self::build(provider, limiter, gazetteer, config, cache)
    }

    fn build<P: GeocodeProvider>(
        provider: Arc<P>,
        limiter: Arc<SlidingWindowLimiter>,
        gazetteer: Gazetteer,
        config: GeocoderConfig,
        cache: TtlCache<String, Option<Coordinate>>,
    ) -> Self {
        let counters = Arc::new(Counters::default());
        let handler = {
            let counters = Arc::clone(&counters);
            move |address: String| {
                let provider = Arc::clone(&provider);
                counters.provider_calls.fetch_add(1, Ordering::Relaxed);
                async move { provider.geocode(&address).await }.boxed()
            }
        };

        Self {
            cache: Mutex::new(cache),
            in_flight: Mutex::new(HashMap::new()),
            queue: RequestQueue::new(handler, limiter, config.queue_delay),
            gazetteer,
            rng: Mutex::new(StdRng::from_os_rng()),
            config,
            counters,
        }
    }

    /// Seed the jitter RNG for reproducible fallbacks.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Resolve one address.
    ///
    /// Empty or all-symbol addresses resolve to `None` without touching the
    /// cache or provider.
    #[instrument(skip(self), level = "debug")]
    pub async fn resolve(&self, address: &str) -> Option<Coordinate> {
        let key = normalize_address(address);
        if key.is_empty() {
            return None;
        }

        if let Some(cached) = self.cached(&key) {
            return cached;
        }

        // Concurrent lookups of one key wait here and then read the cache
        let gate = self.gate(&key);
        let answer = {
            let _held = gate.lock().await;
            match self.cached(&key) {
                Some(cached) => cached,
                None => self.lookup(address, key.clone()).await,
            }
        };
        self.release_gate(&key, &gate);
        answer
    }

    async fn lookup(&self, address: &str, key: String) -> Option<Coordinate> {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        match self.queue.submit(address.trim().to_string()).await {
            QueueOutcome::Completed(Ok(Some(coord))) => match validate_coordinate(coord) {
                Ok(coord) => {
                    self.cache_store(key, Some(coord), self.config.success_ttl);
                    return Some(coord);
                }
                Err(e) => warn!(key = %key, error = %e, "provider returned invalid coordinate"),
            },
            QueueOutcome::Completed(Ok(None)) => debug!(key = %key, "provider found nothing"),
            QueueOutcome::Completed(Err(e)) => warn!(key = %key, error = %e, "geocoding failed"),
            QueueOutcome::RateLimited => debug!(key = %key, "geocoding rate limited"),
            QueueOutcome::Dropped => warn!(key = %key, "geocoding queue dropped request"),
        }

        self.fallback(key)
    }

    /// Resolve many addresses, preserving input order.
    ///
    /// Chunks of `batch_size` run concurrently (still serialized by the
    /// queue) with `batch_delay` between chunks. Spellings of one address
    /// share a single provider call.
    pub async fn batch_resolve<S: AsRef<str>>(&self, addresses: &[S]) -> Vec<ResolvedAddress> {
        let mut results = Vec::with_capacity(addresses.len());

        for (i, chunk) in addresses.chunks(self.config.batch_size.max(1)).enumerate() {
            if i > 0 && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }

            let coords = join_all(chunk.iter().map(|a| self.resolve(a.as_ref()))).await;
            results.extend(chunk.iter().zip(coords).map(|(a, coordinate)| ResolvedAddress {
                address: a.as_ref().to_string(),
                coordinate,
            }));
        }

        results
    }

    /// Current counters and cache size.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            provider_calls: self.counters.provider_calls.load(Ordering::Relaxed),
            fallbacks: self.counters.fallbacks.load(Ordering::Relaxed),
            cache_entries: self.lock_cache().len(),
        }
    }

    /// Drop every cached answer.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn fallback(&self, key: String) -> Option<Coordinate> {
        self.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
        let found = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            self.gazetteer.lookup(&key, &mut *rng)
        };
        debug!(key = %key, kind = ?found.map(|m| m.kind), "gazetteer fallback");

        let coordinate = found.map(|m| m.coordinate);
        self.cache_store(key, coordinate, self.config.fallback_ttl);
        coordinate
    }

    fn cached(&self, key: &str) -> Option<Option<Coordinate>> {
        let cached = self.lock_cache().get(&key.to_string())?;
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "geocode cache hit");
        Some(cached)
    }

    fn gate(&self, key: &str) -> KeyGate {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(in_flight.entry(key.to_string()).or_default())
    }

    fn release_gate(&self, key: &str, gate: &KeyGate) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if in_flight.get(key).is_some_and(|g| Arc::ptr_eq(g, gate)) {
            in_flight.remove(key);
        }
    }

    fn cache_store(&self, key: String, value: Option<Coordinate>, ttl: Duration) {
        self.lock_cache().insert(key, value, Some(ttl));
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, TtlCache<String, Option<Coordinate>>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}
