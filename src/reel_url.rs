//! Instagram reel URL validation and shortcode extraction.

use url::Url;

/// Path prefixes under which Instagram serves downloadable media.
const CONTENT_SEGMENTS: &[&str] = &["reel", "reels", "p"];

/// Extracts the shortcode from an Instagram reel URL.
///
/// Accepts `http(s)://(www.)instagram.com/reel/<shortcode>[/...]` along with
/// the `reels` and `p` path forms. Returns `None` for anything else, so no
/// request is ever made for a URL that cannot name a reel.
pub fn parse_reel_url(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    let host = parsed.host_str()?.to_ascii_lowercase();
    if host != "instagram.com" && host != "www.instagram.com" {
        return None;
    }

    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 || !CONTENT_SEGMENTS.contains(&segments[0]) {
        return None;
    }

    let shortcode = segments[1];
    let well_formed = shortcode
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if shortcode.is_empty() || !well_formed {
        return None;
    }

    Some(shortcode.to_string())
}

pub fn is_reel_url(input: &str) -> bool {
    parse_reel_url(input).is_some()
}
