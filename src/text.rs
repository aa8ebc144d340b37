//! Display-text cleanup for guide and channel strings.

use once_cell::sync::Lazy;
use regex::Regex;

static NETWORK_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,3}\s-\s").unwrap());
static NETWORK_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\([A-Z]{2,3}\)$").unwrap());

/// Maximum description length kept from the guide, in characters
pub const DESCRIPTION_LIMIT: usize = 200;

/// Decode the five standard XML entity escapes. Nothing else is touched.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Strip network noise from a raw channel name.
///
/// "UK - Sky News (HD)" style names lose the leading country/network tag and
/// the trailing bracketed tag. Names that don't fit the pattern are returned
/// trimmed and decoded.
pub fn clean_display_name(name: &str) -> String {
    let decoded = decode_entities(name.trim());
    let without_prefix = NETWORK_PREFIX.replace(&decoded, "");
    NETWORK_SUFFIX.replace(&without_prefix, "").into_owned()
}

/// Name key used to match guide channel refs against channel names:
/// lowercased with everything outside `[a-z0-9]` removed.
pub fn normalize_name_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Truncate to [`DESCRIPTION_LIMIT`] characters, appending "..." when cut.
pub fn truncate_description(desc: String) -> String {
    match desc.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => format!("{}...", &desc[..cut]),
        None => desc,
    }
}
