//! Navigation strategies and the per-platform plan order

use serde::Serialize;
use storefinder_geo::validate_coordinate;

use crate::error::{NavigationError, Result};
use crate::links::{android_intent_url, apple_maps_url, google_maps_ios_url, web_url, NavigationRequest};
use crate::platform::{Os, PlatformInfo};

/// How a link is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Custom scheme or intent handled by a native app
    AppScheme,
    /// Plain HTTPS page
    Web,
}

/// A built deep link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationLink {
    /// Strategy that built it
    pub strategy: &'static str,
    /// URL to open
    pub url: String,
    /// App scheme or web page
    pub kind: LinkKind,
}

/// One way of opening directions.
pub trait NavigationStrategy: Send + Sync {
    /// Stable strategy name for logs and host messages.
    fn name(&self) -> &'static str;

    /// Build the link, refusing invalid coordinates.
    fn build(&self, request: &NavigationRequest) -> Result<NavigationLink>;
}

fn checked(request: &NavigationRequest) -> Result<()> {
    validate_coordinate(request.origin).map_err(NavigationError::InvalidOrigin)?;
    validate_coordinate(request.destination).map_err(NavigationError::InvalidDestination)?;
    Ok(())
}

macro_rules! strategy {
    ($(#[$meta:meta])* $ty:ident, $name:literal, $kind:expr, $builder:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl NavigationStrategy for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn build(&self, request: &NavigationRequest) -> Result<NavigationLink> {
                checked(request)?;
                Ok(NavigationLink {
                    strategy: $name,
                    url: $builder(request),
                    kind: $kind,
                })
            }
        }
    };
}

strategy!(
    /// Google Maps iOS app (`comgooglemaps://`)
    GoogleMapsIos, "google_maps_ios", LinkKind::AppScheme, google_maps_ios_url
);
strategy!(
    /// Apple Maps (`maps://`)
    AppleMaps, "apple_maps", LinkKind::AppScheme, apple_maps_url
);
strategy!(
    /// Android intent into Google Maps
    AndroidIntent, "android_intent", LinkKind::AppScheme, android_intent_url
);
strategy!(
    /// Google Maps in the browser
    WebDirections, "web", LinkKind::Web, web_url
);

/// Strategies to try, in order, for a platform. Always ends with the web.
pub fn strategies_for(platform: PlatformInfo) -> Vec<Box<dyn NavigationStrategy>> {
    match (platform.os, platform.is_mobile) {
        (Os::Ios, true) => vec![
            Box::new(GoogleMapsIos),
            Box::new(AppleMaps),
            Box::new(WebDirections),
        ],
        (Os::Android, true) => vec![Box::new(AndroidIntent), Box::new(WebDirections)],
        _ => vec![Box::new(WebDirections)],
    }
}
