//! Character encoding detection for fetched pages.
//!
//! Detail pages arrive as raw bytes. The charset is taken from the HTTP
//! `Content-Type` header when present, then from the document's own meta
//! declarations, and defaults to UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("valid regex")
});

/// Match the `charset=` parameter of a `Content-Type` value
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).expect("valid regex")
});

/// Detect the encoding of a page.
///
/// Only the first 1024 bytes are searched for meta declarations.
#[must_use]
pub fn detect_encoding(html: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some(encoding) = content_type
        .and_then(|ct| CONTENT_TYPE_CHARSET_RE.captures(ct))
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
    {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(1024)]);
    CHARSET_META_RE
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode page bytes to a UTF-8 string.
///
/// Invalid sequences become U+FFFD rather than errors.
#[must_use]
pub fn decode_page(html: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(html, content_type);
    if encoding == UTF_8 {
        return String::from_utf8_lossy(html).into_owned();
    }
    let (decoded, _, _) = encoding.decode(html);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn detect_from_content_type_header() {
        let html = b"<html><body>x</body></html>";
        let encoding = detect_encoding(html, Some("text/html; charset=ISO-8859-1"));
        assert_eq!(encoding, WINDOWS_1252);
    }

    #[test]
    fn header_wins_over_meta() {
        let html = br#"<html><head><meta charset="windows-1252"></head></html>"#;
        assert_eq!(detect_encoding(html, Some("text/html; charset=utf-8")), UTF_8);
    }

    #[test]
    fn detect_from_meta_charset() {
        let html = br#"<html><head><meta charset="windows-1252"></head></html>"#;
        assert_eq!(detect_encoding(html, None), WINDOWS_1252);
    }

    #[test]
    fn default_is_utf8() {
        assert_eq!(detect_encoding(b"<p>plain</p>", Some("text/html")), UTF_8);
    }

    #[test]
    fn decode_latin1_page() {
        let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
        assert!(decode_page(html, None).contains("Café"));
    }
}
