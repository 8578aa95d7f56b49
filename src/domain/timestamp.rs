// Timestamp domain model - time markers of heterogeneous precision
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::cmp::Ordering;
use std::fmt::{self, Write};

/// Wire shape of a full-precision timestamp, whole seconds.
const DATETIME_PATTERN: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Native shape of a full-precision timestamp carrying milliseconds.
const DATETIME_MILLIS_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Normalized representation backing comparisons: zero-padded and always complete.
const NORMALIZED_PATTERN: &str = DATETIME_MILLIS_PATTERN;

/// Precision of a timestamp as received from the data source.
///
/// `Unknown` is a construction hint only ("sniff the text"); a built
/// [`Timestamp`] never reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TimestampKind {
    Year,
    Month,
    Date,
    DateTime,
    Literal,
    #[default]
    Unknown,
}

impl TimestampKind {
    /// Sniffing order, most precise first.
    const PROBE_ORDER: [TimestampKind; 4] = [
        TimestampKind::DateTime,
        TimestampKind::Date,
        TimestampKind::Month,
        TimestampKind::Year,
    ];

    /// strftime pattern matching this precision.
    pub fn native_pattern(&self) -> Option<&'static str> {
        match self {
            TimestampKind::Year => Some("%Y"),
            TimestampKind::Month => Some("%Y-%m"),
            TimestampKind::Date => Some("%Y-%m-%d"),
            TimestampKind::DateTime => Some(DATETIME_PATTERN),
            TimestampKind::Literal | TimestampKind::Unknown => None,
        }
    }

    /// Lenient mapping of the precision indicators found in dataset documents.
    pub fn from_indicator(indicator: &str) -> Self {
        match indicator.trim().to_ascii_lowercase().as_str() {
            "year" => TimestampKind::Year,
            "month" => TimestampKind::Month,
            "date" | "day" => TimestampKind::Date,
            "datetime" | "date-time" | "timestamp" => TimestampKind::DateTime,
            "literal" => TimestampKind::Literal,
            _ => TimestampKind::Unknown,
        }
    }
}

/// An immutable, comparable time marker.
///
/// Partial precisions are completed with `-01` for month and day and
/// `T12:00:00Z` for the time of day. Literal values ("2007/2008") keep their
/// original text and render it verbatim for every pattern.
#[derive(Debug, Clone)]
pub struct Timestamp {
    original: String,
    kind: TimestampKind,
    instant: Option<DateTime<Utc>>,
    normalized: String,
}

impl Timestamp {
    /// Build from raw text, probing the supported precisions.
    pub fn parse(raw: &str) -> Self {
        Self::with_kind(raw, TimestampKind::Unknown)
    }

    /// Build from raw text with a known precision. A strict parse failure
    /// degrades to a literal; `Unknown` probes.
    pub fn with_kind(raw: &str, kind: TimestampKind) -> Self {
        let resolved = match kind {
            TimestampKind::Unknown => TimestampKind::PROBE_ORDER
                .iter()
                .find_map(|candidate| parse_strict(raw, *candidate).map(|i| (*candidate, i))),
            TimestampKind::Literal => None,
            known => parse_strict(raw, known).map(|i| (known, i)),
        };

        match resolved {
            Some((kind, instant)) => Self::complete(raw.to_string(), kind, instant),
            None => {
                if kind != TimestampKind::Literal {
                    tracing::debug!("Timestamp '{}' kept as literal (hint: {:?})", raw, kind);
                }
                Self::literal(raw)
            }
        }
    }

    /// Build a year-precision timestamp from a bare integer year.
    pub fn from_year(year: i32) -> Self {
        match NaiveDate::from_ymd_opt(year, 1, 1) {
            Some(date) => Self::complete(year.to_string(), TimestampKind::Year, midday(date)),
            None => Self::literal(&year.to_string()),
        }
    }

    /// Build a full-precision timestamp from epoch milliseconds.
    pub fn from_epoch_millis(millis: i64) -> Self {
        match DateTime::from_timestamp_millis(millis) {
            Some(instant) => Self::complete(millis.to_string(), TimestampKind::DateTime, instant),
            None => Self::literal(&millis.to_string()),
        }
    }

    pub fn literal(text: &str) -> Self {
        Self {
            original: text.to_string(),
            kind: TimestampKind::Literal,
            instant: None,
            normalized: text.to_string(),
        }
    }

    fn complete(original: String, kind: TimestampKind, instant: DateTime<Utc>) -> Self {
        let normalized = instant.format(NORMALIZED_PATTERN).to_string();
        Self {
            original,
            kind,
            instant: Some(instant),
            normalized,
        }
    }

    pub fn kind(&self) -> TimestampKind {
        self.kind
    }

    pub fn original_text(&self) -> &str {
        &self.original
    }

    pub fn is_literal(&self) -> bool {
        self.kind == TimestampKind::Literal
    }

    /// The completed instant; `None` for literals.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Format with a strftime pattern. Literals return their original text;
    /// an invalid pattern falls back to the native format.
    pub fn format(&self, pattern: &str) -> String {
        let Some(instant) = self.instant else {
            return self.original.clone();
        };

        let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            tracing::warn!("Invalid timestamp pattern '{}', using native format", pattern);
            return self.native_format();
        }

        let mut out = String::new();
        match write!(out, "{}", instant.format_with_items(items.into_iter())) {
            Ok(()) => out,
            Err(_) => self.native_format(),
        }
    }

    /// Format at this timestamp's own precision ("1991", "1991-06", ...).
    /// Sub-second datetimes keep their milliseconds.
    pub fn native_format(&self) -> String {
        match (self.instant, self.kind.native_pattern()) {
            (Some(instant), Some(_))
                if self.kind == TimestampKind::DateTime && instant.timestamp_subsec_millis() != 0 =>
            {
                instant.format(DATETIME_MILLIS_PATTERN).to_string()
            }
            (Some(instant), Some(pattern)) => instant.format(pattern).to_string(),
            _ => self.original.clone(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.native_format())
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized
            .cmp(&other.normalized)
            .then(self.kind.cmp(&other.kind))
    }
}

fn midday(date: NaiveDate) -> DateTime<Utc> {
    let noon = date
        .and_hms_opt(12, 0, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::default()));
    Utc.from_utc_datetime(&noon)
}

/// `dddd`, `dddd-dd` and `dddd-dd-dd` shapes; chrono alone accepts unpadded fields.
fn has_shape(raw: &str, dashes: &[usize], len: usize) -> bool {
    raw.len() == len
        && raw.bytes().enumerate().all(|(i, b)| {
            if dashes.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_digit()
            }
        })
}

fn parse_strict(raw: &str, kind: TimestampKind) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    match kind {
        TimestampKind::Year => {
            if !has_shape(raw, &[], 4) {
                return None;
            }
            let year = raw.parse().ok()?;
            NaiveDate::from_ymd_opt(year, 1, 1).map(midday)
        }
        TimestampKind::Month => {
            if !has_shape(raw, &[4], 7) {
                return None;
            }
            NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d")
                .ok()
                .map(midday)
        }
        TimestampKind::Date => {
            if !has_shape(raw, &[4, 7], 10) {
                return None;
            }
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(midday)
        }
        TimestampKind::DateTime => {
            match raw.get(..10) {
                Some(day) if raw.len() >= 20 && has_shape(day, &[4, 7], 10) => {}
                _ => return None,
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, DATETIME_PATTERN) {
                return Some(Utc.from_utc_datetime(&naive));
            }
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|instant| instant.with_timezone(&Utc))
        }
        TimestampKind::Literal | TimestampKind::Unknown => None,
    }
}
