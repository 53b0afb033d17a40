//! Profile URL helpers: storage identity, owner slug, and sub-page URLs.

use std::sync::OnceLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

/// Strips the query string and fragment from a URL.
fn without_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Derives the filename-safe storage identifier from a profile URL.
///
/// The identifier is the last path segment, percent-decoded, with every
/// character outside alphanumerics, `-`, `_` and `.` replaced by `_`.
///
/// Returns `None` when the URL has no usable segment.
#[must_use]
pub fn profile_id_from_url(url: &str) -> Option<String> {
    let path = without_query(url.trim()).trim_matches('/');
    let segment = path.rsplit('/').next()?;
    if segment.contains(':') {
        return None;
    }
    let decoded = percent_decode_str(segment).decode_utf8_lossy();

    let id: String = decoded
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if id.is_empty() || id.chars().all(|c| c == '.') {
        return None;
    }
    Some(id)
}

fn owner_slug_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/in/([^/?#]+)").expect("owner slug regex is valid"))
}

/// Returns the `/in/<slug>` segment identifying the profile owner.
///
/// Falls back to [`profile_id_from_url`] for URLs without an `/in/` segment.
#[must_use]
pub fn owner_slug_from_url(url: &str) -> Option<String> {
    owner_slug_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| percent_decode_str(m.as_str()).decode_utf8_lossy().into_owned())
        .filter(|slug| !slug.is_empty())
        .or_else(|| profile_id_from_url(url))
}

/// Joins a sub-page path onto the profile URL.
///
/// `profile_subpage("https://x/in/jane/?a=1", "recent-activity/all/")`
/// yields `https://x/in/jane/recent-activity/all/`.
#[must_use]
pub fn profile_subpage(url: &str, path: &str) -> String {
    let base = without_query(url.trim()).trim_end_matches('/');
    format!("{base}/{}", path.trim_start_matches('/'))
}
