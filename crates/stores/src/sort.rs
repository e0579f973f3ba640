//! Store list ordering

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::record::StoreRecord;

/// Sort order for the store list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Nearest first, unknown distance last
    #[default]
    Distance,
    /// By name, ignoring case and accents
    Alphabetical,
    /// Best rated first, unrated as 0
    Rating,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" | "nearest" => Ok(Self::Distance),
            "alphabetical" | "name" | "az" | "a-z" => Ok(Self::Alphabetical),
            "rating" | "rated" => Ok(Self::Rating),
            other => Err(format!("unknown sort key '{other}' (expected distance, alphabetical, rating)")),
        }
    }
}

/// Accent- and case-insensitive key for alphabetical ordering.
pub fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .trim()
        .to_string()
}

fn by_distance(a: &StoreRecord, b: &StoreRecord) -> Ordering {
    match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_rating(a: &StoreRecord, b: &StoreRecord) -> Ordering {
    b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0))
}

/// Sort in place. Stable: ties keep their input order.
pub fn sort_stores(stores: &mut [StoreRecord], key: SortKey) {
    match key {
        SortKey::Distance => stores.sort_by(by_distance),
        SortKey::Rating => stores.sort_by(by_rating),
        SortKey::Alphabetical => {
            stores.sort_by_cached_key(|s| (collation_key(&s.name), s.name.clone()));
        }
    }
}
