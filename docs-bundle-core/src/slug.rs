//! Slug validation and generation.

use std::sync::OnceLock;

use regex::Regex;

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // RFC 3986 unreserved characters; '/' is the path separator and never allowed.
        Regex::new(r"^[A-Za-z0-9._~-]+$").expect("static slug regex is valid")
    })
}

/// Returns true when `slug` is a non-empty, URL-safe token without path separators.
pub fn is_valid_slug(slug: &str) -> bool {
    slug_pattern().is_match(slug)
}

/// Generate a slug from display text.
///
/// Lowercases ASCII alphanumerics, turns whitespace, `-`, `_` and `/` into single
/// hyphens and drops everything else.
///
/// ```
/// use docs_bundle_core::slug::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("Calls & Streams / Tools"), "calls-streams-tools");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() || c == '-' || c == '_' || c == '/' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
