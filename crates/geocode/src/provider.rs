//! Provider seams for geocoding and directions
//!
//! Implemented over HTTP by `storefinder-api-client`; tests plug in
//! in-memory fakes.

use std::future::Future;

use storefinder_geo::Coordinate;

use crate::directions::Route;
use crate::error::{GeocodeError, Result};

/// Address to coordinate lookups.
pub trait GeocodeProvider: Send + Sync + 'static {
    /// Geocode a raw address.
    ///
    /// `Ok(None)` means the provider answered but found nothing.
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Option<Coordinate>>> + Send;
}

/// Driving routes between two points.
pub trait DirectionsProvider: Send + Sync + 'static {
    /// Fetch a driving route. `Ok(None)` means no route exists.
    fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<Option<Route>>> + Send;
}

/// Provider that is never reachable.
///
/// Used when no API key is configured: every lookup goes straight to the
/// gazetteer or the straight-line route estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl GeocodeProvider for OfflineProvider {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinate>> {
        Err(GeocodeError::Unavailable("offline mode".into()))
    }
}

impl DirectionsProvider for OfflineProvider {
    async fn directions(&self, _origin: Coordinate, _destination: Coordinate) -> Result<Option<Route>> {
        Err(GeocodeError::Unavailable("offline mode".into()))
    }
}
