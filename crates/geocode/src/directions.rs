//! Driving directions with a straight-line fallback

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use storefinder_core::cache::{CacheConfig, TtlCache};
use storefinder_core::clock::SharedClock;
use storefinder_core::rate_limit::SlidingWindowLimiter;
use storefinder_geo::{distance_km, validate_coordinate, Coordinate};
use tracing::{debug, warn};

use crate::error::Result;
use crate::provider::DirectionsProvider;
use crate::queue::{QueueOutcome, RequestQueue};

/// Average urban driving speed used for estimated routes.
pub const FALLBACK_SPEED_KMH: f64 = 30.0;

/// A driving route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Polyline vertices from origin to destination
    pub route_coordinates: Vec<Coordinate>,
    /// Human readable distance, e.g. `"5.2 km"`
    pub distance_text: String,
    /// Human readable duration, e.g. `"12 mins"`
    pub duration_text: String,
    /// True when this is a straight-line estimate, not a provider route
    #[serde(default)]
    pub estimated: bool,
}

impl Route {
    /// Straight-line route at [`FALLBACK_SPEED_KMH`].
    pub fn estimate(origin: Coordinate, destination: Coordinate) -> Self {
        let km = distance_km(&origin, &destination);
        let km = if km.is_finite() { km } else { 0.0 };
        let minutes = (km / FALLBACK_SPEED_KMH * 60.0).ceil();

        Self {
            route_coordinates: vec![origin, destination],
            distance_text: format_distance(km),
            duration_text: format_duration(minutes as u64),
            estimated: true,
        }
    }
}

/// Format kilometres the way map apps do: metres under 1 km.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as u64)
    } else {
        format!("{km:.1} km")
    }
}

/// Format whole minutes as `"N mins"` or `"H hours M mins"`.
pub fn format_duration(minutes: u64) -> String {
    let unit = |n: u64, one: &str, many: &str| format!("{n} {}", if n == 1 { one } else { many });
    match (minutes / 60, minutes % 60) {
        (0, m) => unit(m.max(1), "min", "mins"),
        (h, 0) => unit(h, "hour", "hours"),
        (h, m) => format!("{} {}", unit(h, "hour", "hours"), unit(m, "min", "mins")),
    }
}

type RouteKey = (String, String);
type Lookup = Result<Option<Route>>;

/// Cached, rate-limited directions lookups.
///
/// Invalid endpoints are an error; provider trouble is not and yields a
/// [`Route::estimate`] instead.
pub struct DirectionsService {
    cache: Mutex<TtlCache<RouteKey, Route>>,
    queue: RequestQueue<(Coordinate, Coordinate), Lookup>,
    success_ttl: Duration,
    fallback_ttl: Duration,
}

impl std::fmt::Debug for DirectionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectionsService")
            .field("queue", &self.queue)
            .field("success_ttl", &self.success_ttl)
            .finish_non_exhaustive()
    }
}

impl DirectionsService {
    /// Create a service sharing `limiter` with the geocoder.
    pub fn new<P: DirectionsProvider>(
        provider: Arc<P>,
        limiter: Arc<SlidingWindowLimiter>,
        cache: CacheConfig,
        success_ttl: Duration,
        fallback_ttl: Duration,
        queue_delay: Duration,
    ) -> Self {
        let cache = TtlCache::new(cache);
        Self::build(provider, limiter, cache, success_ttl, fallback_ttl, queue_delay)
    }

    /// Like [`DirectionsService::new`] with an injected cache clock.
    pub fn with_clock<P: DirectionsProvider>(
        provider: Arc<P>,
        limiter: Arc<SlidingWindowLimiter>,
        cache: CacheConfig,
        success_ttl: Duration,
        fallback_ttl: Duration,
        clock: SharedClock,
    ) -> Self {
        let cache = TtlCache::with_clock(cache, clock);
        Self::build(provider, limiter, cache, success_ttl, fallback_ttl, Duration::ZERO)
    }

    fn build<P: DirectionsProvider>(
        provider: Arc<P>,
        limiter: Arc<SlidingWindowLimiter>,
        cache: TtlCache<RouteKey, Route>,
        success_ttl: Duration,
        fallback_ttl: Duration,
        queue_delay: Duration,
    ) -> Self {
        let handler = move |(origin, destination): (Coordinate, Coordinate)| {
            let provider = Arc::clone(&provider);
            async move { provider.directions(origin, destination).await }.boxed()
        };

        Self {
            cache: Mutex::new(cache),
            queue: RequestQueue::new(handler, limiter, queue_delay),
            success_ttl,
            fallback_ttl,
        }
    }

    /// Route from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns the validation error if either endpoint is out of range or
    /// the `(0, 0)` sentinel.
    pub async fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route> {
        let origin = validate_coordinate(origin)?;
        let destination = validate_coordinate(destination)?;
        let key = (origin.to_string(), destination.to_string());

        if let Some(route) = self.lock_cache().get(&key) {
            debug!(origin = %key.0, destination = %key.1, "directions cache hit");
            return Ok(route);
        }

        let failure = match self.queue.submit((origin, destination)).await {
            QueueOutcome::Completed(Ok(Some(route))) if !route.route_coordinates.is_empty() => {
                self.lock_cache().insert(key, route.clone(), Some(self.success_ttl));
                return Ok(route);
            }
            QueueOutcome::Completed(Ok(_)) => "no route".to_string(),
            QueueOutcome::Completed(Err(e)) => e.to_string(),
            QueueOutcome::RateLimited => "rate limited".to_string(),
            QueueOutcome::Dropped => "queue dropped request".to_string(),
        };
        warn!(origin = %key.0, destination = %key.1, reason = %failure, "using straight-line route");

        let route = Route::estimate(origin, destination);
        self.lock_cache().insert(key, route.clone(), Some(self.fallback_ttl));
        Ok(route)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, TtlCache<RouteKey, Route>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}
