//! Address normalization for cache keys

use unicode_normalization::UnicodeNormalization;

/// Fold an address into its cache key.
///
/// Decomposes Unicode (NFD), drops diacritics and every other non-ASCII
/// character, keeps only `[A-Za-z0-9 ,.#-]`, collapses whitespace and
/// lowercases.
///
/// # Example
/// ```
/// use storefinder_geocode::normalize_address;
///
/// assert_eq!(normalize_address("  Café  Coffee Day, #12 <MG Rd> "), "cafe coffee day, #12 mg rd");
/// assert_eq!(normalize_address("???"), "");
/// ```
pub fn normalize_address(address: &str) -> String {
    let filtered: String = address
        .nfd()
        .filter(char::is_ascii)
        .map(|c| if c.is_ascii_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '.' | '#' | '-'))
        .collect();

    filtered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses() {
        assert_eq!(normalize_address("Koramangala"), "koramangala");
        assert_eq!(normalize_address("  HSR   Layout\t Sector 2 "), "hsr layout sector 2");
    }

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(normalize_address("Bengalūru"), "bengaluru");
        assert_eq!(normalize_address("Ñandú Café"), "nandu cafe");
    }

    #[test]
    fn test_strips_non_ascii_scripts() {
        assert_eq!(normalize_address("ಬೆಂಗಳೂರು Indiranagar"), "indiranagar");
    }

    #[test]
    fn test_keeps_allowed_punctuation() {
        assert_eq!(normalize_address("#42, 5th Cross - Block A."), "#42, 5th cross - block a.");
        assert_eq!(normalize_address("Shop (3) @ Mall!"), "shop 3 mall");
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(normalize_address(""), "");
        assert_eq!(normalize_address("   "), "");
        assert_eq!(normalize_address("日本"), "");
    }

    #[test]
    fn test_equivalent_spellings_share_a_key() {
        assert_eq!(normalize_address("MG Road"), normalize_address("  mg   ROAD "));
    }
}
