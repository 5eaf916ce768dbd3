//! Date/time recognition used as a field-classification signal.
//!
//! The recognizer finds date and clock-time mentions in a string and pairs
//! them into ranges. It never rejects a field; it only tells the classifier
//! how many example values look like dates.

use chrono::{NaiveDate, NaiveTime};
use regex::Captures;

use crate::patterns::{
    CLOCK_TIME, DAY_MONTH_YEAR, ISO_DATE, MONTH_DAY_YEAR, NUMERIC_DATE, RANGE_SEPARATOR,
};

/// A recognized point in time. Either part may be missing ("March 3",
/// "19:30"); a date without a year is validated against a leap year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePoint {
    /// Calendar date, if mentioned.
    pub date: Option<NaiveDate>,
    /// Whether the year was part of the text.
    pub has_year: bool,
    /// Clock time, if mentioned.
    pub time: Option<NaiveTime>,
}

/// A single point or a start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First point.
    pub start: DatePoint,
    /// Second point, for ranges.
    pub end: Option<DatePoint>,
}

/// Capability: find zero or more date/time ranges in a string.
pub trait DateRecognizer {
    /// Parse `text`; an empty result means "not a date".
    fn parse(&self, text: &str) -> Vec<DateRange>;
}

/// Regex-driven recognizer for ISO, numeric and month-name dates in
/// English, German and French, plus clock times.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternDateRecognizer;

const MONTHS: &[(&str, u32)] = &[
    ("january", 1), ("february", 2), ("march", 3), ("april", 4), ("may", 5), ("june", 6),
    ("july", 7), ("august", 8), ("september", 9), ("october", 10), ("november", 11),
    ("december", 12),
    ("januar", 1), ("jänner", 1), ("februar", 2), ("märz", 3), ("maerz", 3), ("mai", 5),
    ("juni", 6), ("juli", 7), ("oktober", 10), ("dezember", 12),
    ("janvier", 1), ("février", 2), ("fevrier", 2), ("mars", 3), ("avril", 4), ("juin", 6),
    ("juillet", 7), ("août", 8), ("aout", 8), ("septembre", 9), ("octobre", 10),
    ("novembre", 11), ("décembre", 12), ("decembre", 12),
];

/// Month number for a full or abbreviated (at least three letters) month name.
#[must_use]
pub fn month_number(word: &str) -> Option<u32> {
    let word = word.to_lowercase();
    let word = word.trim_end_matches('.');
    if word.chars().count() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .find(|(name, _)| *name == word)
        .or_else(|| MONTHS.iter().find(|(name, _)| name.starts_with(word)))
        .map(|&(_, n)| n)
}

fn num(caps: &Captures, i: usize) -> Option<u32> {
    caps.get(i).and_then(|m| m.as_str().parse().ok())
}

fn year(caps: &Captures, i: usize) -> Option<i32> {
    let raw = caps.get(i)?.as_str();
    let y: i32 = raw.parse().ok()?;
    Some(if raw.len() == 2 { 2000 + y } else { y })
}

fn date_point(year: Option<i32>, month: u32, day: u32) -> Option<DatePoint> {
    NaiveDate::from_ymd_opt(year.unwrap_or(2000), month, day).map(|d| DatePoint {
        date: Some(d),
        has_year: year.is_some(),
        time: None,
    })
}

fn clock(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour = match meridiem.map(str::to_ascii_lowercase).as_deref() {
        Some("pm") if hour < 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        Some(_) if hour > 12 => return None,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

struct Found {
    start: usize,
    end: usize,
    point: DatePoint,
}

impl PatternDateRecognizer {
    fn find_points(text: &str) -> Vec<Found> {
        let mut found: Vec<Found> = Vec::new();
        let overlaps = |found: &[Found], s: usize, e: usize| {
            found.iter().any(|f| s < f.end && f.start < e)
        };

        for caps in ISO_DATE.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let point = num(&caps, 2).zip(num(&caps, 3)).and_then(|(mo, d)| {
                let mut p = date_point(year(&caps, 1), mo, d)?;
                if let (Some(h), Some(mi)) = (num(&caps, 4), num(&caps, 5)) {
                    p.time = clock(h, mi, None);
                }
                Some(p)
            });
            if let Some(point) = point {
                found.push(Found { start: m.start(), end: m.end(), point });
            }
        }

        for caps in NUMERIC_DATE.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            if overlaps(&found, m.start(), m.end()) {
                continue;
            }
            let (Some(a), Some(b)) = (num(&caps, 1), num(&caps, 3)) else { continue };
            let (day, month) = if caps.get(2).is_some_and(|s| s.as_str() == "/") {
                (b, a)
            } else {
                (a, b)
            };
            if let Some(point) = date_point(year(&caps, 4), month, day) {
                found.push(Found { start: m.start(), end: m.end(), point });
            }
        }

        for (re, month_group, day_group) in [(&*MONTH_DAY_YEAR, 1, 2), (&*DAY_MONTH_YEAR, 2, 1)] {
            for caps in re.captures_iter(text) {
                let Some(m) = caps.get(0) else { continue };
                if overlaps(&found, m.start(), m.end()) {
                    continue;
                }
                let month = caps.get(month_group).and_then(|w| month_number(w.as_str()));
                let (Some(month), Some(day)) = (month, num(&caps, day_group)) else {
                    continue;
                };
                if let Some(point) = date_point(year(&caps, 3), month, day) {
                    found.push(Found { start: m.start(), end: m.end(), point });
                }
            }
        }

        for caps in CLOCK_TIME.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            if overlaps(&found, m.start(), m.end()) {
                continue;
            }
            let (Some(h), Some(mi)) = (num(&caps, 1), num(&caps, 2)) else { continue };
            let Some(time) = clock(h, mi, caps.get(3).map(|x| x.as_str())) else {
                continue;
            };
            found.push(Found {
                start: m.start(),
                end: m.end(),
                point: DatePoint { date: None, has_year: false, time: Some(time) },
            });
        }

        found.sort_by_key(|f| f.start);
        attach_times(found, text)
    }
}

/// Fold a time-only point into an immediately preceding date without time
/// ("March 3, 19:30").
fn attach_times(found: Vec<Found>, text: &str) -> Vec<Found> {
    let mut out: Vec<Found> = Vec::new();
    for f in found {
        if let Some(prev) = out.last_mut() {
            let gap = &text[prev.end..f.start];
            let joinable = gap.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '@')
                .is_empty()
                || gap.trim().eq_ignore_ascii_case("at")
                || gap.trim().eq_ignore_ascii_case("um")
                || gap.trim().eq_ignore_ascii_case("à");
            if f.point.date.is_none() && prev.point.date.is_some() && prev.point.time.is_none() && joinable {
                prev.point.time = f.point.time;
                prev.end = f.end;
                continue;
            }
        }
        out.push(f);
    }
    out
}

impl DateRecognizer for PatternDateRecognizer {
    fn parse(&self, text: &str) -> Vec<DateRange> {
        let points = Self::find_points(text);
        let mut ranges = Vec::new();
        let mut i = 0;
        while i < points.len() {
            let start = &points[i];
            if let Some(next) = points.get(i + 1) {
                let gap = &text[start.end..next.start];
                let is_range = RANGE_SEPARATOR
                    .find(gap)
                    .is_some_and(|m| m.start() == 0 && m.end() == gap.len());
                if is_range || gap.trim() == "-" {
                    ranges.push(DateRange { start: start.point, end: Some(next.point) });
                    i += 2;
                    continue;
                }
            }
            ranges.push(DateRange { start: start.point, end: None });
            i += 1;
        }
        ranges
    }
}
