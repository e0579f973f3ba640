//! Offline place table used when the provider cannot answer
//!
//! Lookups run in a fixed order against normalized keys:
//! 1. exact name match
//! 2. partial match on the first word of the address
//! 3. the default region, jittered so fallback markers don't stack

use rand::Rng;
use storefinder_core::config::GazetteerConfig;
use storefinder_geo::{round_to, Coordinate, COORDINATE_DECIMALS};

use crate::normalize::normalize_address;

/// Built-in Bangalore neighbourhood table.
const BUILTIN_PLACES: &[(&str, f64, f64)] = &[
    ("koramangala", 12.9352, 77.6245),
    ("indiranagar", 12.9784, 77.6408),
    ("whitefield", 12.9698, 77.7500),
    ("jayanagar", 12.9250, 77.5938),
    ("mg road", 12.9756, 77.6063),
    ("hsr layout", 12.9116, 77.6389),
    ("electronic city", 12.8452, 77.6602),
    ("malleshwaram", 13.0035, 77.5709),
    ("btm layout", 12.9166, 77.6101),
    ("marathahalli", 12.9591, 77.6974),
    ("hebbal", 13.0358, 77.5970),
    ("bangalore", 12.9716, 77.5946),
    ("bengaluru", 12.9716, 77.5946),
];

/// Shortest first word considered for a partial match.
const MIN_PARTIAL_LEN: usize = 3;

/// Which rule produced a gazetteer answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Normalized address equals a place name
    Exact,
    /// First word of the address matched a place
    Partial,
    /// Jittered default region
    Region,
}

/// A gazetteer answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazetteerMatch {
    /// Resolved coordinate
    pub coordinate: Coordinate,
    /// Rule that produced it
    pub kind: MatchKind,
}

/// Static name-to-coordinate table with a regional fallback.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    places: Vec<(String, Coordinate)>,
    region: Option<Coordinate>,
    jitter_degrees: f64,
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Gazetteer {
    /// The built-in Bangalore table with the city centre as default region.
    pub fn builtin() -> Self {
        Self {
            places: BUILTIN_PLACES
                .iter()
                .map(|&(name, lat, lng)| (name.to_string(), Coordinate::new(lat, lng)))
                .collect(),
            region: Some(Coordinate::new(12.9716, 77.5946)),
            jitter_degrees: 0.01,
        }
    }

    /// An empty table with no region fallback.
    pub fn empty() -> Self {
        Self {
            places: Vec::new(),
            region: None,
            jitter_degrees: 0.0,
        }
    }

    /// Build from the `[gazetteer]` config section.
    ///
    /// Configured places come first so they shadow built-in names.
    pub fn from_config(config: &GazetteerConfig) -> Self {
        let mut places: Vec<(String, Coordinate)> = config
            .places
            .iter()
            .map(|p| (normalize_address(&p.name), Coordinate::new(p.lat, p.lng)))
            .filter(|(name, _)| !name.is_empty())
            .collect();

        if config.builtin {
            places.extend(
                BUILTIN_PLACES
                    .iter()
                    .map(|&(name, lat, lng)| (name.to_string(), Coordinate::new(lat, lng))),
            );
        }

        let [lat, lng] = config.default_region;
        Self {
            places,
            region: config.region_fallback.then(|| Coordinate::new(lat, lng)),
            jitter_degrees: config.jitter_degrees.abs(),
        }
    }

    /// Add a place. Later additions never shadow earlier ones.
    pub fn with_place(mut self, name: &str, coordinate: Coordinate) -> Self {
        let key = normalize_address(name);
        if !key.is_empty() {
            self.places.push((key, coordinate));
        }
        self
    }

    /// Replace the default region. `None` disables the region fallback.
    pub fn with_region(mut self, region: Option<Coordinate>, jitter_degrees: f64) -> Self {
        self.region = region;
        self.jitter_degrees = jitter_degrees.abs();
        self
    }

    /// Number of named places.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// True if no named places are loaded.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Look up an already-normalized key.
    pub fn lookup<R: Rng + ?Sized>(&self, key: &str, rng: &mut R) -> Option<GazetteerMatch> {
        if let Some(coordinate) = self.exact(key) {
            return Some(GazetteerMatch {
                coordinate,
                kind: MatchKind::Exact,
            });
        }

        if let Some(coordinate) = self.partial(key) {
            return Some(GazetteerMatch {
                coordinate,
                kind: MatchKind::Partial,
            });
        }

        self.region.map(|region| GazetteerMatch {
            coordinate: self.jitter(region, rng),
            kind: MatchKind::Region,
        })
    }

    fn exact(&self, key: &str) -> Option<Coordinate> {
        self.places
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, coord)| *coord)
    }

    fn partial(&self, key: &str) -> Option<Coordinate> {
        let first = key
            .split(|c: char| c == ' ' || c == ',')
            .find(|w| !w.is_empty())?;
        if first.len() < MIN_PARTIAL_LEN {
            return None;
        }

        self.places
            .iter()
            .find(|(name, _)| {
                name.split(' ').next() == Some(first) || name.starts_with(first)
            })
            .map(|(_, coord)| *coord)
    }

    fn jitter<R: Rng + ?Sized>(&self, region: Coordinate, rng: &mut R) -> Coordinate {
        if self.jitter_degrees <= 0.0 {
            return region;
        }
        let j = self.jitter_degrees;
        let lat = (region.lat + rng.random_range(-j..=j)).clamp(-90.0, 90.0);
        let lng = (region.lng + rng.random_range(-j..=j)).clamp(-180.0, 180.0);
        Coordinate::new(
            round_to(lat, COORDINATE_DECIMALS),
            round_to(lng, COORDINATE_DECIMALS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use storefinder_core::config::GazetteerPlace;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_exact_match() {
        let g = Gazetteer::builtin();
        let m = g.lookup("koramangala", &mut rng()).unwrap();
        assert_eq!(m.kind, MatchKind::Exact);
        assert_eq!(m.coordinate, Coordinate::new(12.9352, 77.6245));
    }

    #[test]
    fn test_multi_word_exact_match() {
        let g = Gazetteer::builtin();
        let m = g.lookup("electronic city", &mut rng()).unwrap();
        assert_eq!(m.kind, MatchKind::Exact);
        assert_eq!(m.coordinate, Coordinate::new(12.8452, 77.6602));
    }

    #[test]
    fn test_partial_match_on_first_word() {
        let g = Gazetteer::builtin();
        let m = g.lookup("indiranagar, 100 feet road", &mut rng()).unwrap();
        assert_eq!(m.kind, MatchKind::Partial);
        assert_eq!(m.coordinate, Coordinate::new(12.9784, 77.6408));

        let m = g.lookup("hsr sector 2", &mut rng()).unwrap();
        assert_eq!(m.kind, MatchKind::Partial);
        assert_eq!(m.coordinate, Coordinate::new(12.9116, 77.6389));
    }

    #[test]
    fn test_short_first_word_skips_partial() {
        let g = Gazetteer::builtin();
        let m = g.lookup("mg", &mut rng()).unwrap();
        assert_eq!(m.kind, MatchKind::Region);
    }

    #[test]
    fn test_region_fallback_is_jittered_within_bounds() {
        let g = Gazetteer::builtin();
        let mut r = rng();
        for _ in 0..50 {
            let m = g.lookup("unknown street 42", &mut r).unwrap();
            assert_eq!(m.kind, MatchKind::Region);
            assert!((m.coordinate.lat - 12.9716).abs() <= 0.01 + 1e-9);
            assert!((m.coordinate.lng - 77.5946).abs() <= 0.01 + 1e-9);
        }
    }

    #[test]
    fn test_no_region_means_none() {
        let g = Gazetteer::builtin().with_region(None, 0.0);
        assert!(g.lookup("unknown street", &mut rng()).is_none());
        assert!(Gazetteer::empty().lookup("koramangala", &mut rng()).is_none());
    }

    #[test]
    fn test_zero_jitter_returns_region() {
        let region = Coordinate::new(52.52, 13.405);
        let g = Gazetteer::empty().with_region(Some(region), 0.0);
        let m = g.lookup("anything", &mut rng()).unwrap();
        assert_eq!(m.coordinate, region);
    }

    #[test]
    fn test_from_config_places_shadow_builtin() {
        let config = GazetteerConfig {
            places: vec![GazetteerPlace {
                name: "Koramangala".into(),
                lat: 1.5,
                lng: 2.5,
            }],
            ..GazetteerConfig::default()
        };
        let g = Gazetteer::from_config(&config);
        let m = g.lookup("koramangala", &mut rng()).unwrap();
        assert_eq!(m.coordinate, Coordinate::new(1.5, 2.5));
        assert_eq!(g.len(), BUILTIN_PLACES.len() + 1);
    }

    #[test]
    fn test_from_config_without_builtin_or_region() {
        let config = GazetteerConfig {
            builtin: false,
            region_fallback: false,
            ..GazetteerConfig::default()
        };
        let g = Gazetteer::from_config(&config);
        assert!(g.is_empty());
        assert!(g.lookup("koramangala", &mut rng()).is_none());
    }

    #[test]
    fn test_with_place() {
        let g = Gazetteer::empty().with_place("Alexanderplatz", Coordinate::new(52.5219, 13.4132));
        let m = g.lookup("alexanderplatz", &mut rng()).unwrap();
        assert_eq!(m.kind, MatchKind::Exact);
    }
}
