//! Map deep-link URL builders
//!
//! Coordinates are written as plain `lat,lng`. Free text is percent-encoded
//! with the same reserved set as JavaScript's `encodeURIComponent`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use storefinder_geo::Coordinate;

use crate::sanitize::{sanitize_address, sanitize_name};

/// Characters `encodeURIComponent` leaves alone, removed from the encode set.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Google Maps Android package.
pub const GOOGLE_MAPS_PACKAGE: &str = "com.google.android.apps.maps";

/// Android intent zoom hint.
pub const INTENT_ZOOM: u8 = 15;

/// Directions request from a user position to a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationRequest {
    /// Where the user is
    pub origin: Coordinate,
    /// Where the store is
    pub destination: Coordinate,
    /// Store name, shown by the maps app
    #[serde(default)]
    pub destination_name: Option<String>,
    /// Store address
    #[serde(default)]
    pub destination_address: Option<String>,
}

impl NavigationRequest {
    /// Request without display text.
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
            destination_name: None,
            destination_address: None,
        }
    }

    /// Set the store name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.destination_name = Some(name.into());
        self
    }

    /// Set the store address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.destination_address = Some(address.into());
        self
    }

    /// Encoded destination component.
    ///
    /// `name, address` when both survive sanitization, else `name`, else the
    /// raw coordinate.
    pub fn destination_param(&self) -> String {
        let name = sanitize_name(self.destination_name.as_deref());
        let address = sanitize_address(self.destination_address.as_deref());

        match (name, address) {
            (Some(name), Some(address)) => encode_component(&format!("{name}, {address}")),
            (Some(name), None) => encode_component(&name),
            _ => self.destination.to_string(),
        }
    }
}

/// Percent-encode like `encodeURIComponent`.
pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

/// Google Maps web directions. Works everywhere.
pub fn web_url(req: &NavigationRequest) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={}&destination={}&travelmode=driving",
        req.origin,
        req.destination_param()
    )
}

/// Google Maps iOS app scheme.
pub fn google_maps_ios_url(req: &NavigationRequest) -> String {
    format!(
        "comgooglemaps://?saddr={}&daddr={}&directionsmode=driving",
        req.origin,
        req.destination_param()
    )
}

/// Apple Maps app scheme.
pub fn apple_maps_url(req: &NavigationRequest) -> String {
    format!(
        "maps://?saddr={}&daddr={}&dirflg=d",
        req.origin,
        req.destination_param()
    )
}

/// Android intent into Google Maps with the web URL as browser fallback.
pub fn android_intent_url(req: &NavigationRequest) -> String {
    format!(
        "intent://maps.google.com/maps?saddr={}&daddr={}&z={INTENT_ZOOM}\
         #Intent;scheme=https;package={GOOGLE_MAPS_PACKAGE};S.browser_fallback_url={};end",
        req.origin,
        req.destination_param(),
        encode_component(&web_url(req))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> NavigationRequest {
        NavigationRequest::new(Coordinate::new(1.0, 1.0), Coordinate::new(12.9352, 77.6245))
    }

    #[test]
    fn test_encode_component_matches_js() {
        assert_eq!(encode_component("Acme Store"), "Acme%20Store");
        assert_eq!(encode_component("a,b/c?d"), "a%2Cb%2Fc%3Fd");
        assert_eq!(encode_component("it's (ok)!~*"), "it's%20(ok)!~*");
        assert_eq!(encode_component("Café"), "Caf%C3%A9");
    }

    #[test]
    fn test_web_url_with_coordinates() {
        assert_eq!(
            web_url(&req()),
            "https://www.google.com/maps/dir/?api=1&origin=1,1&destination=12.9352,77.6245&travelmode=driving"
        );
    }

    #[test]
    fn test_web_url_with_name_and_address() {
        let r = req().with_name("Acme").with_address("80 Feet Rd, Koramangala");
        assert!(web_url(&r).contains("destination=Acme%2C%2080%20Feet%20Rd%2C%20Koramangala&"));
    }

    #[test]
    fn test_address_alone_uses_coordinates() {
        let r = req().with_address("80 Feet Rd");
        assert!(web_url(&r).contains("destination=12.9352,77.6245&"));
    }

    #[test]
    fn test_ios_url() {
        let url = google_maps_ios_url(&req().with_name("Acme"));
        assert!(url.starts_with("comgooglemaps://"));
        assert!(url.contains("saddr=1,1"));
        assert!(url.contains("daddr=Acme"));
        assert!(url.ends_with("&directionsmode=driving"));
    }

    #[test]
    fn test_apple_maps_url() {
        assert_eq!(
            apple_maps_url(&req().with_name("Acme")),
            "maps://?saddr=1,1&daddr=Acme&dirflg=d"
        );
    }

    #[test]
    fn test_android_intent_url() {
        let url = android_intent_url(&req().with_name("Acme"));
        assert!(url.starts_with("intent://maps.google.com/maps?saddr=1,1&daddr=Acme&z=15#Intent;"));
        assert!(url.contains("package=com.google.android.apps.maps;"));
        assert!(url.contains(
            "S.browser_fallback_url=https%3A%2F%2Fwww.google.com%2Fmaps%2Fdir%2F%3Fapi%3D1%26origin%3D1%2C1"
        ));
        assert!(url.ends_with(";end"));
    }

    #[test]
    fn test_name_is_sanitized_before_encoding() {
        let r = req().with_name("<Acme & Co>");
        assert!(web_url(&r).contains("destination=Acme%20%20Co&"));
    }
}
