//! YouTube URL validation
//!
//! The gate in front of the resolver chain. Policy is host-based: a URL
//! is accepted when its host is a canonical YouTube domain (or any
//! subdomain) or the short-link host. This admits watch, embed, shorts,
//! live, and playlist links alike; backends that cannot handle a given
//! shape decline individually.

use crate::error::{Error, Result};
use url::Url;

/// Hosts accepted by the validator. Subdomains (www., m., music., ...)
/// match as well.
pub const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];

/// Validates a raw URL string against the YouTube host policy
///
/// Returns the parsed URL on success so callers don't parse twice.
pub fn validate_watch_url(raw: &str) -> Result<Url> {
    let parsed = Url::parse(raw).map_err(|_| Error::InvalidUrl(raw.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(raw.to_string()));
    }

    let host = match parsed.host_str() {
        Some(h) => h.to_ascii_lowercase(),
        None => return Err(Error::InvalidUrl(raw.to_string())),
    };

    let accepted = YOUTUBE_HOSTS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")));

    if accepted {
        Ok(parsed)
    } else {
        Err(Error::InvalidUrl(raw.to_string()))
    }
}

/// Extracts the 11-character video id from a YouTube URL, if present
///
/// Handles `watch?v=`, `youtu.be/<id>`, `/embed/<id>`, `/shorts/<id>`,
/// `/live/<id>` and `/v/<id>` shapes. Playlist-only links yield `None`.
pub fn video_id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();

    if host == "youtu.be" {
        return url
            .path_segments()?
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        if !v.is_empty() {
            return Some(v.into_owned());
        }
    }

    let mut segments = url.path_segments()?;
    match segments.next() {
        Some("embed") | Some("shorts") | Some("live") | Some("v") => segments
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}
