//! URL Utility Functions
//!
//! Resolution of extracted link values, URL normalization for cache keys,
//! and slugs for recipe identifiers and cache file names.

use url::Url;

use crate::patterns::BINARY_EXTENSION;

/// Check if a string is a valid absolute HTTP(S) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Resolve a possibly relative link against a base URL.
///
/// Special schemes (`data:`, `javascript:`, `mailto:`, `tel:`) and values
/// that fail to resolve are returned unchanged.
#[must_use]
pub fn create_absolute_url(url_str: &str, base: &Url) -> String {
    let url_str = url_str.trim();

    if url_str.is_empty() {
        return String::new();
    }

    if url_str.starts_with("data:")
        || url_str.starts_with("javascript:")
        || url_str.starts_with("mailto:")
        || url_str.starts_with("tel:")
    {
        return url_str.to_string();
    }

    let (is_abs, _) = is_absolute_url(url_str);
    if is_abs {
        return url_str.to_string();
    }

    match base.join(url_str) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => url_str.to_string(),
    }
}

/// Resolve a link and keep it only if it is a fetchable detail page: an
/// HTTP(S) URL that does not point at a known binary file.
#[must_use]
pub fn resolve_detail_url(url_str: &str, base: Option<&Url>) -> Option<Url> {
    let resolved = match base {
        Some(base) => base.join(url_str.trim()).ok()?,
        None => Url::parse(url_str.trim()).ok()?,
    };
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    if BINARY_EXTENSION.is_match(resolved.path()) {
        return None;
    }
    Some(resolved)
}

/// Parse a URL string into a Url object.
///
/// # Returns
/// * `Some(Url)` if valid absolute URL, `None` otherwise
#[must_use]
pub fn parse_url(url_str: &str) -> Option<Url> {
    let (is_abs, parsed) = is_absolute_url(url_str);
    if is_abs {
        parsed
    } else {
        None
    }
}

/// Normalize a URL by removing the fragment and a trailing path slash.
#[must_use]
pub fn normalize_url(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(&path[..path.len() - 1]);
    }

    url
}

/// File-system and identifier safe slug of a URL.
///
/// The scheme is dropped, the URL normalized, and every run of
/// non-alphanumeric characters collapsed to a single `-`.
#[must_use]
pub fn url_slug(url: &Url) -> String {
    let normalized = normalize_url(url);
    let without_scheme = normalized
        .as_str()
        .split_once("://")
        .map_or(normalized.as_str(), |(_, rest)| rest);
    slugify(without_scheme)
}

/// Slug for the analyzed page, `"page"` when no URL is known.
#[must_use]
pub fn page_slug(url: Option<&str>) -> String {
    url.and_then(parse_url)
        .map(|u| url_slug(&u))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "page".to_string())
}

fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
