//! Free-text sanitization for link components

/// Longest destination name kept, in chars.
pub const MAX_NAME_CHARS: usize = 100;

/// Longest destination address kept, in chars.
pub const MAX_ADDRESS_CHARS: usize = 200;

/// Strip `<>"'&` and control characters, trim, then cap at `max_chars`.
///
/// # Example
/// ```
/// use storefinder_navigation::sanitize::sanitize_text;
///
/// assert_eq!(sanitize_text("  <b>Tom & Jerry's</b>\n", 100), "bTom  Jerrys/b");
/// ```
pub fn sanitize_text(input: &str, max_chars: usize) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&') && !c.is_control())
        .collect();

    cleaned.trim().chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Sanitize a destination name. Empty results become `None`.
pub fn sanitize_name(name: Option<&str>) -> Option<String> {
    name.map(|n| sanitize_text(n, MAX_NAME_CHARS))
        .filter(|n| !n.is_empty())
}

/// Sanitize a destination address. Empty results become `None`.
pub fn sanitize_address(address: Option<&str>) -> Option<String> {
    address
        .map(|a| sanitize_text(a, MAX_ADDRESS_CHARS))
        .filter(|a| !a.is_empty())
}
