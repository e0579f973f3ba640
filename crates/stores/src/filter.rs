//! Store list filters

use std::collections::BTreeSet;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::StoreRecord;
use crate::sort::SortKey;

// Patterns run against lowercased hours text. A 24-hour clock time must not
// follow a digit or colon, so seconds and minutes never read as hours.
static TWENTY_FOUR_HOURS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(24 ?hours|24 ?hrs|24/7|24x7|open 24)\b").expect("static regex")
});

static OPEN_EARLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b0?[5-7](:[0-5]\d)? ?am\b|(^|[^\d:])0[5-7]:[0-5]\d|\bearly\b").expect("static regex")
});

static OPEN_LATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b1[01](:[0-5]\d)? ?pm\b|\b12(:00)? ?am\b|\bmidnight\b|(^|[^\d:])2[23]:[0-5]\d|\blate\b",
    )
    .expect("static regex")
});

static OPEN_WEEKENDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(sat(urday)?|sun(day)?|weekends?|daily|all days|7 days|24/7)\b").expect("static regex")
});

/// Opening-hours tags a user can select.
///
/// Declaration order is the order tags are consulted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursTag {
    /// Open around the clock
    TwentyFourHours,
    /// Opens by 7am
    OpenEarly,
    /// Open past 10pm
    OpenLate,
    /// Open on weekends
    OpenWeekends,
}

impl HoursTag {
    /// Every tag, in consultation order.
    pub const ALL: [HoursTag; 4] = [
        HoursTag::TwentyFourHours,
        HoursTag::OpenEarly,
        HoursTag::OpenLate,
        HoursTag::OpenWeekends,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            Self::TwentyFourHours => &TWENTY_FOUR_HOURS,
            Self::OpenEarly => &OPEN_EARLY,
            Self::OpenLate => &OPEN_LATE,
            Self::OpenWeekends => &OPEN_WEEKENDS,
        }
    }

    /// True if the lowercased hours text satisfies this tag.
    ///
    /// Keywords match whole words only.
    pub fn matches(self, hours_lower: &str) -> bool {
        self.pattern().is_match(hours_lower)
    }

    /// Short name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwentyFourHours => "24h",
            Self::OpenEarly => "early",
            Self::OpenLate => "late",
            Self::OpenWeekends => "weekends",
        }
    }
}

impl std::fmt::Display for HoursTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoursTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "24h" | "24" | "24-hours" | "24_hours" | "twenty_four_hours" => Ok(Self::TwentyFourHours),
            "early" | "open-early" | "open_early" => Ok(Self::OpenEarly),
            "late" | "open-late" | "open_late" => Ok(Self::OpenLate),
            "weekends" | "weekend" | "open-weekends" | "open_weekends" => Ok(Self::OpenWeekends),
            other => Err(format!("unknown hours tag '{other}' (expected 24h, early, late, weekends)")),
        }
    }
}

/// User-selected filters and sort order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Selected hours tags
    pub hours_tags: BTreeSet<HoursTag>,
    /// Radius limit in km
    pub max_distance_km: Option<f64>,
    /// Sort order
    pub sort_key: SortKey,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            hours_tags: BTreeSet::new(),
            max_distance_km: None,
            sort_key: SortKey::Distance,
        }
    }
}

impl FilterState {
    /// Back to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: HoursTag) -> Self {
        self.hours_tags.insert(tag);
        self
    }

    /// Set the radius.
    pub fn with_max_distance(mut self, km: f64) -> Self {
        self.max_distance_km = Some(km);
        self
    }

    /// Set the sort order.
    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort_key = key;
        self
    }

    /// Select or deselect a tag. Returns true if now selected.
    pub fn toggle_tag(&mut self, tag: HoursTag) -> bool {
        if self.hours_tags.remove(&tag) {
            false
        } else {
            self.hours_tags.insert(tag);
            true
        }
    }

    /// True when nothing narrows the list.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Radius filter. Stores without a distance never pass.
pub fn within_distance(store: &StoreRecord, max_km: f64) -> bool {
    store.distance_km.is_some_and(|d| d <= max_km)
}

/// Hours filter.
///
/// Only the first selected tag (in [`HoursTag::ALL`] order) decides; later
/// selected tags are not consulted. No tags means pass; no hours text means
/// fail.
pub fn passes_hours(store: &StoreRecord, tags: &BTreeSet<HoursTag>) -> bool {
    let Some(first) = tags.iter().next() else {
        return true;
    };
    store
        .hours
        .as_deref()
        .is_some_and(|hours| first.matches(&hours.to_lowercase()))
}
