//! Compiled regex patterns used across the discovery pipeline.
//!
//! All patterns are compiled once at first use via `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Navigation
// =============================================================================

/// Matches accessibility labels of "next page" anchors ("Next", "next page", "Next »").
pub static NEXT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*next\b").expect("NEXT_LABEL regex")
});

// =============================================================================
// URL Classification
// =============================================================================

/// Matches URLs pointing at image files. Such URL fields are never treated
/// as detail-page links.
pub static IMAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:jpe?g|png|gif|svg|webp|bmp|ico|avif|tiff?)(?:[?#].*)?$")
        .expect("IMAGE_EXTENSION regex")
});

/// Matches URLs pointing at binary downloads that are never fetched as
/// detail pages.
pub static BINARY_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\.(?:jpe?g|png|gif|svg|webp|bmp|ico|avif|tiff?|pdf|zip|gz|tar|rar|7z|mp3|mp4|m4a|wav|ogg|avi|mov|mkv|webm|docx?|xlsx?|pptx?|exe|dmg|iso)(?:[?#].*)?$",
    )
    .expect("BINARY_EXTENSION regex")
});

// =============================================================================
// Text Cleaning
// =============================================================================

/// Matches runs of whitespace for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex")
});

// =============================================================================
// Date/Time Recognition
// =============================================================================

/// ISO-8601 date with optional time: `2024-03-15`, `2024-03-15T19:30`, `2024-03-15 19:30:00`.
pub static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2}))?)?")
        .expect("ISO_DATE regex")
});

/// Numeric day-first dates with dots (`15.03.2024`) or month-first with
/// slashes (`03/15/2024`). Two-digit years are accepted.
pub static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})([./])(\d{1,2})[./](\d{4}|\d{2})\b").expect("NUMERIC_DATE regex")
});

/// Month name followed by day and optional year: `March 15, 2024`, `Mar 15`.
pub static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-zäéû]{3,10})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?(?:\s+(\d{4}))?\b")
        .expect("MONTH_DAY_YEAR regex")
});

/// Day followed by month name and optional year: `15 March 2024`, `15. März`.
pub static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\.?\s+([a-zäéû]{3,10})\.?(?:\s+(\d{4}))?\b")
        .expect("DAY_MONTH_YEAR regex")
});

/// Clock time: `19:30`, `7:30 pm`, `19h30`.
pub static CLOCK_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})[:h](\d{2})\s*(am|pm)?\b").expect("CLOCK_TIME regex")
});

/// Separator between the start and end of a range.
pub static RANGE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:–|—|\s-\s|\bto\b|\bbis\b|\bau\b)\s*").expect("RANGE_SEPARATOR regex")
});
