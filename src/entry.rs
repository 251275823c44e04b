use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize;

pub type EntryKey = u64;

/// One logged line as the store hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub time: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<EntryKey>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("unparsable entry time: {0:?}")]
    UnparsableTime(String),
}

impl RawEntry {
    pub fn new(time: impl Into<String>, text: impl Into<String>) -> Self {
        Self { time: time.into(), text: text.into(), key: None }
    }

    pub fn with_key(mut self, key: EntryKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn instant(&self) -> Result<NaiveDateTime, EntryError> {
        parse_entry_time(&self.time)
    }
}

/// Parses the local wall-clock time of an entry.
pub fn parse_entry_time(s: &str) -> Result<NaiveDateTime, EntryError> {
    let s = s.trim();
    parse_with_offset(s)
        .or_else(|| parse_naive(s))
        .or_else(|| parse_date_only(s))
        .ok_or_else(|| EntryError::UnparsableTime(s.to_string()))
}

/// Offset-carrying times keep the wall-clock reading as typed and drop the
/// offset, so they sort among the surrounding local-naive entries unshifted.
fn parse_with_offset(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    // rfc3339 insists on seconds
    let fmts = [
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%dT%H:%M%#z",
        "%Y-%m-%d %H:%M%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
    ];
    if let Some(dt) = fmts.iter().find_map(|f| DateTime::parse_from_str(s, f).ok()) {
        return Some(dt.naive_local());
    }
    s.strip_suffix('Z').or_else(|| s.strip_suffix('z')).and_then(parse_naive)
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    // datetime-local inputs omit seconds
    let fmts = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ];
    fmts.iter().find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}

fn parse_date_only(s: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Entries whose text contains `query`, compared on normalized forms.
pub fn filter_entries<'a>(entries: &'a [RawEntry], query: &str) -> Vec<&'a RawEntry> {
    entries
        .iter()
        .filter(|e| normalize::contains_normalized(&e.text, query))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStats {
    pub count: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

impl EntryStats {
    /// `count` covers every entry; `first`/`last` only those with a parsable time.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a RawEntry>,
    {
        let mut count = 0;
        let span = entries
            .into_iter()
            .inspect(|_| count += 1)
            .filter_map(|e| e.instant().ok())
            .minmax()
            .into_option();
        Self { count, first: span.map(|(f, _)| f), last: span.map(|(_, l)| l) }
    }
}

/// Status of a search over the log: stats of the matching entries next to the
/// size of the whole log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatus {
    pub matching: EntryStats,
    pub total: usize,
}

impl SearchStatus {
    pub fn for_query(entries: &[RawEntry], query: &str) -> Self {
        Self { matching: EntryStats::from_entries(filter_entries(entries, query)), total: entries.len() }
    }

    pub fn summary(&self) -> String {
        match (self.matching.count, self.total) {
            (0, 0) => "No entries".to_string(),
            (0, _) => "No entries match filter".to_string(),
            (n, total) if n != total => format!("Showing {n} of {total} entries."),
            (n, _) => format!("Showing {n} entries."),
        }
    }
}

#[cfg(test)]
mod time_parse_tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn datetime_local_without_seconds() {
        let t = parse_entry_time("2024-03-10T08:15").unwrap();
        assert_eq!(t.hour(), 8);
        assert_eq!(t.minute(), 15);
        assert_eq!(t.second(), 0);
    }

    #[test]
    fn fractional_seconds_and_space_separator() {
        assert!(parse_naive("2024-03-10 08:15:30.250").is_some());
        assert!(parse_naive("2024-03-10T08:15:30").is_some());
    }

    #[test]
    fn offsets_keep_the_typed_wall_clock() {
        let t = parse_entry_time("2024-03-10T08:15:00+02:00").unwrap();
        assert_eq!(t.hour(), 8);
        let z = parse_entry_time("2024-03-10T08:15:00Z").unwrap();
        assert_eq!(z.hour(), 8);
        let neg = parse_entry_time("2024-03-10T23:30:00-05:00").unwrap();
        assert_eq!((neg.day(), neg.hour()), (10, 23));
    }

    #[test]
    fn minute_precision_with_offset_or_zulu() {
        let expected = parse_entry_time("2024-03-10T09:00").unwrap();
        assert_eq!(parse_entry_time("2024-03-10T09:00Z").unwrap(), expected);
        assert_eq!(parse_entry_time("2024-03-10T09:00+02:00").unwrap(), expected);
        assert_eq!(parse_entry_time("2024-03-10T09:00-0330").unwrap(), expected);
        assert_eq!(parse_entry_time("2024-03-10 09:00+01:00").unwrap(), expected);
        assert_eq!(parse_entry_time("2024-03-10T09:00:00Z").unwrap(), expected);
    }

    #[test]
    fn bare_date_is_midnight() {
        let t = parse_date_only("2024-03-10").unwrap();
        assert_eq!((t.hour(), t.minute()), (0, 0));
    }

    #[test]
    fn garbage_is_rejected_with_raw_value() {
        let err = parse_entry_time("  yesterday ").unwrap_err();
        assert_eq!(err, EntryError::UnparsableTime("yesterday".into()));
        assert!(parse_entry_time("2024-13-40T25:00").is_err());
    }
}
